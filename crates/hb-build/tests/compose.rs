//! Composition pipeline tests over a temporary working directory.

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use hb_build::{
    BuildError, BuildState, BuildStep, CancellationToken, Composer, CompositionContext,
    DUPLICATE_TOC_ID_CODE, ExecutionBehavior, ExecutionPoint, PlugIn, PlugInError, ProgressSink,
};
use hb_toc::{
    ApiAttachment, ContentPlacement, HelpFormat, PlacementSettings, TocEntry, read_toc,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const CONCEPTUAL: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<topics>
  <topic id="overview" title="Overview">
    <topic id="welcome" file="Welcome" />
    <topic id="usage" file="Usage" apiParentMode="InsertAfter" />
  </topic>
  <topic id="license" file="License" />
</topics>
"#;

const API: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<topics>
  <topic id="N:Lib" file="N_Lib">
    <topic id="T:Lib.Widget" file="T_Lib_Widget" />
  </topic>
  <topic id="N:Lib.Extras" file="N_Lib_Extras" />
</topics>
"#;

const WEB_TOC: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<HelpTOC>
  <HelpTOCNode Title="Overview">
    <HelpTOCNode Title="Welcome" Url="html/Welcome.htm" />
  </HelpTOCNode>
</HelpTOC>
"#;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn working_dir(files: &[(&str, &str)]) -> TempDir {
    let temp = tempfile::tempdir().unwrap();
    for (relative, content) in files {
        write(temp.path(), relative, content);
    }
    temp
}

fn settings(formats: &[HelpFormat]) -> PlacementSettings {
    PlacementSettings {
        formats: formats.iter().copied().collect(),
        ..PlacementSettings::default()
    }
}

#[derive(Clone, Default)]
struct RecordingProgress {
    log: Arc<Mutex<Vec<String>>>,
}

impl ProgressSink for RecordingProgress {
    fn report(&mut self, step: Option<BuildStep>, message: fmt::Arguments<'_>) {
        let line = match step {
            Some(step) => format!("[{step}] {message}"),
            None => message.to_string(),
        };
        self.log.lock().unwrap().push(line);
    }
}

struct Hook {
    points: Vec<ExecutionPoint>,
    log: Arc<Mutex<Vec<String>>>,
    default_topic: Option<&'static str>,
}

impl PlugIn for Hook {
    fn name(&self) -> &str {
        "hook"
    }

    fn execution_points(&self) -> Vec<ExecutionPoint> {
        self.points.clone()
    }

    fn execute(
        &mut self,
        context: &mut CompositionContext,
        point: ExecutionPoint,
    ) -> Result<(), PlugInError> {
        self.log
            .lock()
            .unwrap()
            .push(format!("{} {}", point.behavior, point.step));
        if let Some(topic) = self.default_topic {
            context.default_topic = Some(topic.to_owned());
        }
        Ok(())
    }
}

#[test]
fn full_build_merges_and_renders() {
    let work = working_dir(&[
        ("_ConceptualTOC_.xml", CONCEPTUAL),
        ("toc.xml", API),
        ("WebTOC.xml", WEB_TOC),
        ("Output/HtmlHelp1/html/Welcome.htm", ""),
        ("Output/HtmlHelp1/html/M_Add,Int32.htm", ""),
        ("Output/Website/html/Welcome.htm", ""),
    ]);
    let context = CompositionContext::new(
        work.path(),
        settings(&[HelpFormat::HtmlHelp1, HelpFormat::Website]),
    );
    let progress = RecordingProgress::default();

    let mut composer = Composer::new(context).with_progress(progress.clone());
    let state = composer.run().unwrap();

    let merged = read_toc(&work.path().join("toc.xml")).unwrap();
    assert_eq!(
        merged.ids(),
        vec![
            "Overview",
            "welcome",
            "usage",
            "N:Lib",
            "T:Lib.Widget",
            "N:Lib.Extras",
            "license"
        ]
    );
    let overview = &merged.entries()[0];
    assert_eq!(overview.file, None);
    assert_eq!(overview.children[2].sort_order, 2);

    assert_eq!(state.default_topic.as_deref(), Some("html/Welcome.htm"));
    assert_eq!(state.api_parent_id.as_deref(), Some("overview"));
    assert_eq!(state.api_insertion_index, Some(2));
    assert_eq!(state.warnings.len(), 1);
    assert!(state.warnings[0].message.contains("M_Add,Int32.htm"));
    assert_eq!(
        BuildState::load(&work.path().join("build-state.json")).unwrap(),
        state
    );

    let html = fs::read_to_string(work.path().join("WebTOC.html")).unwrap();
    assert!(html.contains(r#"href="html/Welcome.htm" target="TopicContent">Welcome</a>"#));
    assert_eq!(composer.context().html_toc.as_deref(), Some(html.as_str()));

    let log = progress.log.lock().unwrap();
    let steps: Vec<_> = log.iter().filter(|l| l.starts_with('[')).collect();
    assert_eq!(steps.len(), 4, "got {log:?}");
    assert!(steps[0].starts_with("[ApiContentPlacement]"));
    assert!(log.last().unwrap().contains("1 warning(s)"));
}

#[test]
fn placement_writes_sort_orders() {
    let work = working_dir(&[("_ConceptualTOC_.xml", CONCEPTUAL), ("toc.xml", API)]);
    let mut composer = Composer::new(CompositionContext::new(
        work.path(),
        PlacementSettings {
            toc_order: 4,
            ..settings(&[HelpFormat::MsHelp2])
        },
    ));

    composer.determine_api_content_placement().unwrap();

    let decision = composer.context().decision.clone().unwrap();
    assert_eq!(
        decision.attachment,
        ApiAttachment::Topic {
            id: "overview".to_owned(),
            index: 2
        }
    );
    assert_eq!(decision.sort_order, 2);

    let api = read_toc(&work.path().join("toc.xml")).unwrap();
    assert_eq!(api.entries()[0].sort_order, 2);
    let conceptual = read_toc(&work.path().join("_ConceptualTOC_.xml")).unwrap();
    assert_eq!(conceptual.entries()[0].sort_order, 4);
}

#[test]
fn api_only_build_uses_project_order() {
    let work = working_dir(&[("toc.xml", API)]);
    let mut composer = Composer::new(CompositionContext::new(
        work.path(),
        PlacementSettings {
            toc_order: 5,
            ..settings(&[HelpFormat::MsHelpViewer])
        },
    ));

    let state = composer.run().unwrap();

    let toc = read_toc(&work.path().join("toc.xml")).unwrap();
    assert_eq!(toc.ids(), vec!["N:Lib", "T:Lib.Widget", "N:Lib.Extras"]);
    assert_eq!(toc.entries()[0].sort_order, 5);
    assert_eq!(state.api_sort_order, Some(5));
    assert_eq!(state.default_topic, None);
}

#[test]
fn visible_root_container_is_fatal() {
    let conceptual = r#"<topics>
  <topic id="root" file="root" rootContainer="root">
    <topic id="welcome" file="Welcome" />
  </topic>
</topics>"#;
    let work = working_dir(&[("_ConceptualTOC_.xml", conceptual), ("toc.xml", API)]);
    let mut composer = Composer::new(CompositionContext::new(
        work.path(),
        settings(&[HelpFormat::MsHelpViewer]),
    ));

    let err = composer.run().unwrap_err();

    assert_eq!(err.code(), Some("BE0069"));
    assert!(err.to_string().contains("ID=root"));
    assert_eq!(fs::read_to_string(work.path().join("toc.xml")).unwrap(), API);
    assert!(!work.path().join("build-state.json").exists());
}

#[test]
fn unresolved_default_topic_keeps_toc() {
    let work = working_dir(&[("_ConceptualTOC_.xml", CONCEPTUAL), ("toc.xml", API)]);
    let mut composer = Composer::new(CompositionContext::new(
        work.path(),
        settings(&[HelpFormat::Website]),
    ));
    composer.determine_api_content_placement().unwrap();
    let before = fs::read_to_string(work.path().join("toc.xml")).unwrap();

    let err = composer.combine_intermediate_toc_files().unwrap_err();

    assert_eq!(err.code(), Some("BE0026"));
    assert!(err.to_string().starts_with("BE0026: Unable to determine default topic"));
    assert_eq!(
        fs::read_to_string(work.path().join("toc.xml")).unwrap(),
        before
    );
}

#[test]
fn preset_default_topic_skips_resolution() {
    let work = working_dir(&[("_ConceptualTOC_.xml", CONCEPTUAL), ("toc.xml", API)]);
    let context = CompositionContext::new(work.path(), settings(&[HelpFormat::Website]))
        .with_default_topic("html/Start.htm");

    let state = Composer::new(context).run().unwrap();

    assert_eq!(state.default_topic.as_deref(), Some("html/Start.htm"));
}

#[test]
fn website_toc_falls_back_to_merged_toc() {
    let work = working_dir(&[
        ("_ConceptualTOC_.xml", CONCEPTUAL),
        ("toc.xml", API),
        ("Output/Website/html/Welcome.html", ""),
    ]);
    let mut composer = Composer::new(CompositionContext::new(
        work.path(),
        settings(&[HelpFormat::Website]),
    ));

    let state = composer.run().unwrap();
    assert_eq!(state.default_topic.as_deref(), Some("html/Welcome.html"));

    let html = fs::read_to_string(work.path().join("WebTOC.html")).unwrap();
    assert!(html.contains(r##"href="#">Overview</a>"##), "got:\n{html}");
    assert!(html.contains(r#"href="N_Lib" target="TopicContent">"#));
}

#[test]
fn cancelled_build_stops_before_first_step() {
    let work = working_dir(&[("toc.xml", API)]);
    let token = CancellationToken::new();
    let mut composer = Composer::new(CompositionContext::new(
        work.path(),
        settings(&[HelpFormat::Website]),
    ))
    .with_cancellation(token.clone());

    token.cancel();
    let err = composer.run().unwrap_err();

    assert!(err.is_cancelled());
    assert!(matches!(
        err,
        BuildError::Cancelled(BuildStep::ApiContentPlacement)
    ));
    assert!(composer.context().decision.is_none());
}

#[test]
fn cancellation_between_steps() {
    struct CancelAfterPlacement(CancellationToken);

    impl PlugIn for CancelAfterPlacement {
        fn name(&self) -> &str {
            "cancel"
        }

        fn execution_points(&self) -> Vec<ExecutionPoint> {
            vec![ExecutionPoint::new(
                BuildStep::ApiContentPlacement,
                ExecutionBehavior::After,
            )]
        }

        fn execute(
            &mut self,
            _context: &mut CompositionContext,
            _point: ExecutionPoint,
        ) -> Result<(), PlugInError> {
            self.0.cancel();
            Ok(())
        }
    }

    let work = working_dir(&[("_ConceptualTOC_.xml", CONCEPTUAL), ("toc.xml", API)]);
    let token = CancellationToken::new();
    let mut composer = Composer::new(CompositionContext::new(
        work.path(),
        settings(&[HelpFormat::MsHelp2]),
    ))
    .with_cancellation(token.clone())
    .with_plugin(CancelAfterPlacement(token));

    let err = composer.run().unwrap_err();

    assert!(matches!(
        err,
        BuildError::Cancelled(BuildStep::CombiningIntermediateTocFiles)
    ));
    assert!(composer.context().decision.is_some());
    // Not merged
    let toc = read_toc(&work.path().join("toc.xml")).unwrap();
    assert_eq!(toc.len(), 2);
}

#[test]
fn instead_of_plugin_replaces_step() {
    let work = working_dir(&[("_ConceptualTOC_.xml", CONCEPTUAL), ("toc.xml", API)]);
    let log = Arc::new(Mutex::new(Vec::new()));
    let step = BuildStep::CombiningIntermediateTocFiles;
    let hook = Hook {
        points: vec![
            ExecutionPoint::new(step, ExecutionBehavior::InsteadOf),
            ExecutionPoint::new(step, ExecutionBehavior::Before),
            ExecutionPoint::new(step, ExecutionBehavior::After),
        ],
        log: Arc::clone(&log),
        default_topic: Some("html/Custom.htm"),
    };

    let mut composer = Composer::new(CompositionContext::new(
        work.path(),
        settings(&[HelpFormat::Website]),
    ))
    .with_plugin(hook);
    composer.determine_api_content_placement().unwrap();
    composer.combine_intermediate_toc_files().unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec!["instead of CombiningIntermediateTocFiles"]
    );
    assert_eq!(
        composer.context().default_topic.as_deref(),
        Some("html/Custom.htm")
    );
    // Step body skipped: API TOC not merged
    let toc = read_toc(&work.path().join("toc.xml")).unwrap();
    assert_eq!(toc.len(), 2);
}

#[test]
fn before_and_after_plugins_wrap_step() {
    let work = working_dir(&[("_ConceptualTOC_.xml", CONCEPTUAL), ("toc.xml", API)]);
    let log = Arc::new(Mutex::new(Vec::new()));
    let step = BuildStep::CombiningIntermediateTocFiles;
    let hook = Hook {
        points: vec![
            ExecutionPoint::new(step, ExecutionBehavior::After),
            ExecutionPoint::new(step, ExecutionBehavior::Before),
        ],
        log: Arc::clone(&log),
        // Set before the body runs, so no output lookup is needed
        default_topic: Some("html/Preset.htm"),
    };

    let state = Composer::new(CompositionContext::new(
        work.path(),
        settings(&[HelpFormat::HtmlHelp1]),
    ))
    .with_plugin(hook)
    .run()
    .unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "before CombiningIntermediateTocFiles",
            "after CombiningIntermediateTocFiles"
        ]
    );
    assert_eq!(state.default_topic.as_deref(), Some("html/Preset.htm"));
    let toc = read_toc(&work.path().join("toc.xml")).unwrap();
    assert_eq!(toc.entries()[0].id, "Overview");
}

#[test]
fn below_namespaces_without_anchor() {
    let conceptual = r#"<topics><topic id="intro" file="intro" /></topics>"#;
    let work = working_dir(&[("_ConceptualTOC_.xml", conceptual), ("toc.xml", API)]);
    let context = CompositionContext::new(
        work.path(),
        PlacementSettings {
            content_placement: ContentPlacement::BelowNamespaces,
            ..settings(&[HelpFormat::OpenXml])
        },
    );

    let state = Composer::new(context).run().unwrap();

    let toc = read_toc(&work.path().join("toc.xml")).unwrap();
    let top: Vec<&TocEntry> = toc.entries().iter().collect();
    assert_eq!(top[0].id, "N:Lib");
    assert_eq!(top[2].id, "intro");
    assert_eq!(top[2].sort_order, 2);
    assert_eq!(state.api_parent_id, None);
}

#[test]
fn containers_sharing_a_title_are_reported() {
    let conceptual = r#"<topics>
  <topic id="g1" title="Overview">
    <topic id="intro" file="intro" />
  </topic>
  <topic id="g2" title="Overview">
    <topic id="faq" file="faq" />
  </topic>
</topics>"#;
    let work = working_dir(&[("_ConceptualTOC_.xml", conceptual), ("toc.xml", API)]);

    let state = Composer::new(CompositionContext::new(
        work.path(),
        settings(&[HelpFormat::MsHelp2]),
    ))
    .run()
    .unwrap();

    assert_eq!(state.warnings.len(), 1, "got {:?}", state.warnings);
    assert_eq!(state.warnings[0].code, DUPLICATE_TOC_ID_CODE);
    assert!(state.warnings[0].message.contains("'Overview'"));

    // The merged TOC is still written
    let toc = read_toc(&work.path().join("toc.xml")).unwrap();
    assert_eq!(toc.duplicate_ids(), vec!["Overview"]);
}
