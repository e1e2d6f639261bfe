//! Build extension points.
//!
//! Extensions declare the steps and slots they run in. For each step the
//! composer invokes `InsteadOf` extensions first; if any ran, the step body
//! and its `Before`/`After` extensions are skipped.

use crate::context::CompositionContext;
use crate::error::BuildError;
use crate::step::{BuildStep, ExecutionBehavior};

/// Error returned by an extension.
pub type PlugInError = Box<dyn std::error::Error + Send + Sync>;

/// Where an extension runs. Higher priority runs first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExecutionPoint {
    pub step: BuildStep,
    pub behavior: ExecutionBehavior,
    pub priority: i32,
}

impl ExecutionPoint {
    /// Execution point with the default priority.
    #[must_use]
    pub fn new(step: BuildStep, behavior: ExecutionBehavior) -> Self {
        Self {
            step,
            behavior,
            priority: Self::DEFAULT_PRIORITY,
        }
    }

    pub const DEFAULT_PRIORITY: i32 = 1000;

    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// A build extension.
///
/// # Example
///
/// ```
/// use hb_build::{BuildStep, CompositionContext, ExecutionBehavior, ExecutionPoint, PlugIn, PlugInError};
///
/// struct FixedDefaultTopic;
///
/// impl PlugIn for FixedDefaultTopic {
///     fn name(&self) -> &str { "fixed-default-topic" }
///
///     fn execution_points(&self) -> Vec<ExecutionPoint> {
///         vec![ExecutionPoint::new(
///             BuildStep::CombiningIntermediateTocFiles,
///             ExecutionBehavior::Before,
///         )]
///     }
///
///     fn execute(
///         &mut self,
///         context: &mut CompositionContext,
///         _point: ExecutionPoint,
///     ) -> Result<(), PlugInError> {
///         context.default_topic = Some("html/Start.htm".to_owned());
///         Ok(())
///     }
/// }
/// ```
pub trait PlugIn: Send {
    /// Name used in progress messages and errors.
    fn name(&self) -> &str;

    /// Steps and slots the extension runs in.
    fn execution_points(&self) -> Vec<ExecutionPoint>;

    /// Run the extension at `point`.
    ///
    /// # Errors
    ///
    /// Any error aborts the build.
    fn execute(
        &mut self,
        context: &mut CompositionContext,
        point: ExecutionPoint,
    ) -> Result<(), PlugInError>;
}

/// Registered extensions, in registration order.
#[derive(Default)]
pub struct PlugInRegistry {
    plugins: Vec<Box<dyn PlugIn>>,
}

impl PlugInRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<P: PlugIn + 'static>(&mut self, plugin: P) {
        tracing::debug!("Registered plug-in '{}'", plugin.name());
        self.plugins.push(Box::new(plugin));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Run every extension registered for `step` / `behavior`, highest
    /// priority first (registration order breaks ties).
    ///
    /// Returns true if at least one extension ran.
    ///
    /// # Errors
    ///
    /// Returns the first extension error; later extensions do not run.
    pub fn execute(
        &mut self,
        step: BuildStep,
        behavior: ExecutionBehavior,
        context: &mut CompositionContext,
    ) -> Result<bool, BuildError> {
        let mut scheduled: Vec<(usize, ExecutionPoint)> = self
            .plugins
            .iter()
            .enumerate()
            .filter_map(|(index, plugin)| {
                plugin
                    .execution_points()
                    .into_iter()
                    .find(|point| point.step == step && point.behavior == behavior)
                    .map(|point| (index, point))
            })
            .collect();
        scheduled.sort_by_key(|(_, point)| std::cmp::Reverse(point.priority));

        for (index, point) in &scheduled {
            let plugin = &mut self.plugins[*index];
            tracing::debug!("Executing plug-in '{}' {behavior} {step}", plugin.name());
            plugin
                .execute(context, *point)
                .map_err(|source| BuildError::PlugIn {
                    name: plugin.name().to_owned(),
                    step,
                    behavior,
                    source,
                })?;
        }

        Ok(!scheduled.is_empty())
    }
}

impl std::fmt::Debug for PlugInRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.plugins.iter().map(|p| p.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use hb_toc::PlacementSettings;
    use pretty_assertions::assert_eq;

    use super::*;

    struct Recorder {
        name: &'static str,
        points: Vec<ExecutionPoint>,
        log: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    impl PlugIn for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn execution_points(&self) -> Vec<ExecutionPoint> {
            self.points.clone()
        }

        fn execute(
            &mut self,
            _context: &mut CompositionContext,
            point: ExecutionPoint,
        ) -> Result<(), PlugInError> {
            self.log
                .lock()
                .unwrap()
                .push(format!("{}:{}", self.name, point.behavior));
            if self.fail {
                return Err("boom".into());
            }
            Ok(())
        }
    }

    fn recorder(
        name: &'static str,
        points: Vec<ExecutionPoint>,
        log: &Arc<Mutex<Vec<String>>>,
    ) -> Recorder {
        Recorder {
            name,
            points,
            log: Arc::clone(log),
            fail: false,
        }
    }

    fn context() -> CompositionContext {
        CompositionContext::new("/work", PlacementSettings::default())
    }

    #[test]
    fn test_priority_order_and_ties() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let step = BuildStep::CombiningIntermediateTocFiles;
        let before = ExecutionPoint::new(step, ExecutionBehavior::Before);

        let mut registry = PlugInRegistry::new();
        registry.register(recorder("low", vec![before.with_priority(10)], &log));
        registry.register(recorder("first", vec![before], &log));
        registry.register(recorder("second", vec![before], &log));
        registry.register(recorder("high", vec![before.with_priority(5000)], &log));

        let ran = registry
            .execute(step, ExecutionBehavior::Before, &mut context())
            .unwrap();

        assert!(ran);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["high:before", "first:before", "second:before", "low:before"]
        );
    }

    #[test]
    fn test_only_matching_points_run() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = PlugInRegistry::new();
        registry.register(recorder(
            "after-html",
            vec![ExecutionPoint::new(
                BuildStep::GeneratingHtmlToc,
                ExecutionBehavior::After,
            )],
            &log,
        ));

        let ran = registry
            .execute(
                BuildStep::GeneratingHtmlToc,
                ExecutionBehavior::Before,
                &mut context(),
            )
            .unwrap();

        assert!(!ran);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_error_names_plugin() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let step = BuildStep::ApiContentPlacement;
        let mut failing = recorder(
            "broken",
            vec![ExecutionPoint::new(step, ExecutionBehavior::InsteadOf)],
            &log,
        );
        failing.fail = true;

        let mut registry = PlugInRegistry::new();
        registry.register(failing);

        let err = registry
            .execute(step, ExecutionBehavior::InsteadOf, &mut context())
            .unwrap_err();
        assert!(matches!(err, BuildError::PlugIn { ref name, .. } if name == "broken"));
        assert_eq!(
            err.to_string(),
            "Plug-in 'broken' failed instead of step ApiContentPlacement: boom"
        );
    }
}
