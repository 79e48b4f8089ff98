//! Runner that executes every check of a plan.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::plan::Plan;

use super::{Verdict, VerificationReport};

/// Executes plan checks against files under a base directory.
pub struct Runner {
    base_dir: PathBuf,
    sequential: bool,
}

impl Runner {
    /// Create a runner resolving plan paths against `base_dir`.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            sequential: false,
        }
    }

    /// Run checks one after another instead of on the rayon pool.
    pub fn sequential(mut self, sequential: bool) -> Self {
        self.sequential = sequential;
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Run all checks in the plan. Verdicts come back in plan order.
    pub fn run(&self, plan: &Plan) -> VerificationReport {
        tracing::debug!(
            plan = %plan.name,
            checks = plan.checks.len(),
            sequential = self.sequential,
            "running plan"
        );

        let verdicts: Vec<Verdict> = if self.sequential {
            plan.checks.iter().map(|c| c.run(&self.base_dir)).collect()
        } else {
            plan.checks
                .par_iter()
                .map(|c| c.run(&self.base_dir))
                .collect()
        };

        VerificationReport::new(verdicts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::plan::Check;
    use crate::verify::CheckRule;
    use tempfile::TempDir;

    fn plan(checks: Vec<Check>) -> Plan {
        Plan {
            name: "test".to_string(),
            checks,
            ..Default::default()
        }
    }

    #[test]
    fn test_runner_keeps_plan_order() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("Greeter.java"),
            "@Service\npublic class Greeter {}\n",
        )
        .unwrap();

        let checks: Vec<Check> = (0..16)
            .map(|i| Check::ClassAnnotation {
                file: "Greeter.java".to_string(),
                annotation: (if i % 2 == 0 { "Service" } else { "Repository" }).to_string(),
            })
            .collect();
        let plan = plan(checks);

        let parallel = Runner::new(temp.path()).run(&plan);
        let sequential = Runner::new(temp.path()).sequential(true).run(&plan);

        assert_eq!(parallel.total(), 16);
        assert_eq!(parallel.failed_count(), 8);
        for (i, (a, b)) in parallel.verdicts.iter().zip(&sequential.verdicts).enumerate() {
            assert_eq!(a.passed, i % 2 == 0);
            assert_eq!(a.passed, b.passed);
            assert_eq!(a.message, b.message);
        }
    }

    #[test]
    fn test_failure_does_not_abort_later_checks() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("index.jsp"), "<form></form>").unwrap();

        let plan = plan(vec![
            Check::ClassAnnotation {
                file: "Missing.java".to_string(),
                annotation: "Service".to_string(),
            },
            Check::MarkupContains {
                file: "index.jsp".to_string(),
                needle: "<form>".to_string(),
            },
        ]);

        let report = Runner::new(temp.path()).run(&plan);
        assert_eq!(report.verdicts[0].failure, Some(FailureKind::NotFound));
        assert_eq!(report.verdicts[1].rule, CheckRule::MarkupContains);
        assert!(report.verdicts[1].passed);
        assert!(!report.passed());
    }
}
