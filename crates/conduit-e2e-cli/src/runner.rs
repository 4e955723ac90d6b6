//! Scenario selection and sequential execution

use crate::error::{CliError, CliResult};
use conduit_e2e::{run_scenario, E2eConfig, ScenarioKind, ScenarioReport, SessionFactory};
use tracing::info;

/// Resolve scenario names; an empty list selects every scenario
pub fn select_scenarios(names: &[String]) -> CliResult<Vec<ScenarioKind>> {
    if names.is_empty() {
        return Ok(ScenarioKind::all());
    }
    names
        .iter()
        .map(|name| {
            ScenarioKind::from_name(name).ok_or_else(|| {
                let known: Vec<&str> = ScenarioKind::all().into_iter().map(ScenarioKind::name).collect();
                CliError::invalid_argument(format!(
                    "unknown scenario `{name}` (expected one of: {})",
                    known.join(", ")
                ))
            })
        })
        .collect()
}

/// Run `kinds` one after another, each with its own sessions
pub async fn execute<F>(
    kinds: &[ScenarioKind],
    sessions: &dyn SessionFactory,
    config: &E2eConfig,
    fail_fast: bool,
    mut on_report: F,
) -> Vec<ScenarioReport>
where
    F: FnMut(&ScenarioReport),
{
    let mut reports = Vec::with_capacity(kinds.len());
    for &kind in kinds {
        info!(scenario = kind.name(), base_url = %config.base_url, "starting scenario");
        let report = run_scenario(kind, sessions, config).await;
        on_report(&report);
        let failed = !report.passed;
        reports.push(report);
        if failed && fail_fast {
            info!("stopping after first failure");
            break;
        }
    }
    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use conduit_e2e::{E2eError, E2eResult, LoginScenario, TestSession};

    mod select_tests {
        use super::*;

        #[test]
        fn test_empty_selects_all() {
            assert_eq!(select_scenarios(&[]).unwrap(), ScenarioKind::all());
        }

        #[test]
        fn test_named_selection_keeps_order() {
            let names = vec!["article-lifecycle".to_string(), "login-valid".to_string()];
            assert_eq!(
                select_scenarios(&names).unwrap(),
                vec![
                    ScenarioKind::ArticleLifecycle,
                    ScenarioKind::Login(LoginScenario::Valid)
                ]
            );
        }

        #[test]
        fn test_unknown_name_lists_known() {
            let err = select_scenarios(&["logout".to_string()]).unwrap_err();
            let message = err.to_string();
            assert!(message.contains("logout"));
            assert!(message.contains("login-wrong-password"));
        }
    }

    mod execute_tests {
        use super::*;

        fn unavailable(_: &E2eConfig) -> E2eResult<TestSession> {
            Err(E2eError::BrowserLaunch {
                message: "no chromium".to_string(),
            })
        }

        #[tokio::test]
        async fn test_runs_every_scenario_without_fail_fast() {
            let mut seen = Vec::new();
            let reports = execute(&ScenarioKind::all(), &unavailable, &E2eConfig::new(), false, |r| {
                seen.push(r.name.clone());
            })
            .await;
            assert_eq!(reports.len(), 4);
            assert_eq!(seen.len(), 4);
            assert!(reports.iter().all(|r| !r.passed));
        }

        #[tokio::test]
        async fn test_fail_fast_stops_after_first_failure() {
            let reports =
                execute(&ScenarioKind::all(), &unavailable, &E2eConfig::new(), true, |_| {}).await;
            assert_eq!(reports.len(), 1);
            assert_eq!(reports[0].name, "login-valid");
        }
    }
}
