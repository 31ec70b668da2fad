//! Deployment sequencer
//!
//! Executes a scenario plan one step at a time, dispatching each step to the
//! collaborator matching its kind. The first failed step ends the run;
//! nothing already applied is rolled back.

use super::error::DeployError;
use super::plan::ScenarioPlan;
use super::step::{DeploymentStep, StepPayload, StepResult};
use crate::host::{FileTransfer, HostProvisioner, RemoteExecutor};

/// Progress notification emitted around each step
#[derive(Debug)]
pub enum StepEvent<'a> {
    /// About to execute step `index` (zero-based) of `total`
    Started {
        index: usize,
        total: usize,
        step: &'a DeploymentStep,
    },
    /// Step `index` returned
    Finished {
        index: usize,
        total: usize,
        step: &'a DeploymentStep,
        result: &'a StepResult,
    },
}

/// Summary of a run in which every step succeeded
#[derive(Debug, Default)]
pub struct RunReport {
    /// Steps that were dispatched
    pub executed: usize,
}

/// Drives a plan against the provisioning, remote-shell and copy collaborators
pub struct Sequencer<'a> {
    provisioner: &'a dyn HostProvisioner,
    executor: &'a dyn RemoteExecutor,
    transfer: &'a dyn FileTransfer,
}

impl<'a> Sequencer<'a> {
    pub fn new(
        provisioner: &'a dyn HostProvisioner,
        executor: &'a dyn RemoteExecutor,
        transfer: &'a dyn FileTransfer,
    ) -> Self {
        Self {
            provisioner,
            executor,
            transfer,
        }
    }

    /// Execute every step of `plan` in order
    ///
    /// `on_event` sees a `Started` event before each step runs and a
    /// `Finished` event after it returns. The first failed step is returned
    /// as the error and no later step runs.
    pub fn run<F>(&self, plan: &ScenarioPlan, mut on_event: F) -> Result<RunReport, DeployError>
    where
        F: FnMut(StepEvent<'_>),
    {
        let total = plan.len();
        let mut report = RunReport::default();

        tracing::info!("Running {} plan with {} steps", plan.scenario(), total);

        for (index, step) in plan.steps().iter().enumerate() {
            on_event(StepEvent::Started { index, total, step });

            let result = self.dispatch(step);
            report.executed += 1;

            on_event(StepEvent::Finished {
                index,
                total,
                step,
                result: &result,
            });

            if !result.succeeded {
                let err = DeployError::from_step(step, &result);
                tracing::error!("Step {}/{} failed, halting: {}", index + 1, total, err);
                return Err(err);
            }
        }

        Ok(report)
    }

    fn dispatch(&self, step: &DeploymentStep) -> StepResult {
        let host = step.target();
        match step.payload() {
            StepPayload::Provision(spec) => self.provisioner.provision(host, spec),
            StepPayload::Remote(command) => self.executor.execute(command, host),
            StepPayload::Copy(spec) => self.transfer.copy(host, spec),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::deploy::plan::{
        CanaryParams, Scenario, SetupParams, build_canary_plan, build_setup_plan,
    };
    use crate::deploy::{CommandLine, FileCopySpec, ProvisionSpec, RemoteCommand};
    use crate::host::{Host, Role};
    use std::cell::RefCell;

    /// Records every call and fails the calls whose (1-based) number is listed
    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<String>>,
        fail_on: Vec<usize>,
        exit_code: i32,
    }

    impl Recorder {
        fn failing_at(call: usize, exit_code: i32) -> Self {
            Self {
                fail_on: vec![call],
                exit_code,
                ..Default::default()
            }
        }

        fn record(&self, entry: String) -> StepResult {
            let mut calls = self.calls.borrow_mut();
            calls.push(entry);
            if self.fail_on.contains(&calls.len()) {
                StepResult::failure(Some(self.exit_code), "simulated failure")
            } else {
                StepResult::success()
            }
        }

        fn count(&self) -> usize {
            self.calls.borrow().len()
        }
    }

    impl HostProvisioner for Recorder {
        fn provision(&self, host: &Host, spec: &ProvisionSpec) -> StepResult {
            self.record(format!("provision {} {}", host.role, spec))
        }
    }

    impl RemoteExecutor for Recorder {
        fn execute(&self, command: &RemoteCommand, host: &Host) -> StepResult {
            self.record(format!("remote {} {}", host.identity(), command))
        }
    }

    impl FileTransfer for Recorder {
        fn copy(&self, host: &Host, spec: &FileCopySpec) -> StepResult {
            self.record(format!("copy {} {}", host.identity(), spec.local_path))
        }
    }

    fn setup_plan() -> ScenarioPlan {
        build_setup_plan(
            &Config::default(),
            &SetupParams {
                github_user: Some("octocat".to_string()),
                github_pass: Some("pw".to_string()),
                private_key: None,
            },
        )
        .unwrap()
    }

    fn canary_plan() -> ScenarioPlan {
        build_canary_plan(
            &Config::default(),
            &CanaryParams {
                blue_branch: "v1".to_string(),
                green_branch: "v2".to_string(),
                private_key: None,
            },
        )
        .unwrap()
    }

    fn host() -> Host {
        Host::new(Role::Blue, "192.168.33.2".parse().unwrap(), "vagrant")
    }

    #[test]
    fn test_all_steps_run_in_order() {
        let recorder = Recorder::default();
        let sequencer = Sequencer::new(&recorder, &recorder, &recorder);

        let plan = canary_plan();
        let mut started = Vec::new();
        let report = sequencer
            .run(&plan, |event| {
                if let StepEvent::Started { index, step, .. } = event {
                    started.push((index, step.description().to_string()));
                }
            })
            .unwrap();

        assert_eq!(report.executed, 7);
        assert_eq!(recorder.count(), 7);
        assert_eq!(started.len(), 7);
        assert!(started.iter().enumerate().all(|(i, (index, _))| i == *index));

        let calls = recorder.calls.borrow();
        assert!(calls[0].starts_with("provision blue"));
        assert!(calls[1].starts_with("provision green"));
        assert!(calls[2].starts_with("provision proxy"));
        assert!(calls[3].starts_with("remote vagrant@192.168.33.2 rm -rf"));
        assert!(calls[4].starts_with("remote vagrant@192.168.33.3 rm -rf"));
        assert!(calls[5].starts_with("remote vagrant@192.168.33.2 cd "));
        assert!(calls[6].starts_with("remote vagrant@192.168.33.3 cd "));
    }

    #[test]
    fn test_setup_halts_when_port_forward_fails() {
        let recorder = Recorder::failing_at(2, 1);
        let sequencer = Sequencer::new(&recorder, &recorder, &recorder);

        let mut finished = 0;
        let err = sequencer
            .run(&setup_plan(), |event| {
                if let StepEvent::Finished { .. } = event {
                    finished += 1;
                }
            })
            .unwrap_err();

        assert_eq!(recorder.count(), 2);
        assert_eq!(finished, 2);
        assert!(matches!(err, DeployError::Provisioning { .. }));
        assert!(err.to_string().contains("Port forwarding"));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_failure_exit_code_is_propagated() {
        let recorder = Recorder::failing_at(4, 255);
        let sequencer = Sequencer::new(&recorder, &recorder, &recorder);

        let err = sequencer.run(&canary_plan(), |_| {}).unwrap_err();

        assert_eq!(recorder.count(), 4);
        assert!(matches!(err, DeployError::RemoteExecution { .. }));
        assert_eq!(err.exit_code(), 255);
    }

    #[test]
    fn test_first_step_failure_runs_nothing_else() {
        let recorder = Recorder::failing_at(1, 2);
        let sequencer = Sequencer::new(&recorder, &recorder, &recorder);

        assert!(sequencer.run(&canary_plan(), |_| {}).is_err());
        assert_eq!(recorder.count(), 1);
    }

    #[test]
    fn test_copy_step_failure_classified() {
        let recorder = Recorder::failing_at(1, 1);
        let sequencer = Sequencer::new(&recorder, &recorder, &recorder);
        let plan = ScenarioPlan::new(
            Scenario::Setup,
            vec![
                DeploymentStep::copy(
                    "Push key",
                    host(),
                    FileCopySpec {
                        local_path: "key".to_string(),
                        remote_path: ".ssh/id_rsa".to_string(),
                    },
                ),
                DeploymentStep::remote(
                    "After",
                    host(),
                    RemoteCommand::new(CommandLine::new("true")),
                ),
            ],
        );

        let err = sequencer.run(&plan, |_| {}).unwrap_err();
        assert!(matches!(err, DeployError::FileCopy { .. }));
        assert_eq!(recorder.count(), 1);
    }

    #[test]
    fn test_empty_plan_succeeds() {
        let recorder = Recorder::default();
        let sequencer = Sequencer::new(&recorder, &recorder, &recorder);
        let report = sequencer
            .run(&ScenarioPlan::new(Scenario::Canary, Vec::new()), |_| {})
            .unwrap();
        assert_eq!(report.executed, 0);
        assert_eq!(recorder.count(), 0);
    }
}
