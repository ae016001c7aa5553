//! Integration tests for events

#[cfg(test)]
mod tests {
    use nodeup_errors::InstallError;
    use nodeup_events::*;
    use nodeup_types::ContainerRuntime;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_event_sender_delivers_in_order() {
        let (tx, rx) = channel();

        tx.emit_warning("test warning");
        tx.emit_debug("test debug");

        let first = rx.try_recv().unwrap();
        assert!(matches!(
            first.event,
            AppEvent::General(GeneralEvent::Warning { .. })
        ));
        assert_eq!(first.meta.level, EventLevel::Warn);

        let second = rx.try_recv().unwrap();
        assert!(matches!(
            second.event,
            AppEvent::General(GeneralEvent::DebugLog { .. })
        ));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dropped_receiver() {
        let (tx, rx) = channel();
        drop(rx);

        // Should not panic when receiver is dropped
        tx.emit_warning("ignored");
    }

    #[test]
    fn test_delivery_is_synchronous() {
        #[derive(Clone, Default)]
        struct Recorder(Arc<Mutex<Vec<String>>>);

        impl EventSink for Recorder {
            fn handle(&self, message: EventMessage) {
                if let AppEvent::General(GeneralEvent::Notice { message }) = message.event {
                    self.0.lock().unwrap().push(message);
                }
            }
        }

        let recorder = Recorder::default();
        let sender = EventSender::new(recorder.clone());
        sender.emit_notice("Welcome");
        assert_eq!(recorder.0.lock().unwrap().as_slice(), ["Welcome"]);
    }

    #[test]
    fn test_meta_source_follows_domain() {
        let (tx, rx) = channel();
        tx.emit(AppEvent::Runtime(RuntimeEvent::PollAttempt {
            runtime: ContainerRuntime::Docker,
            attempt: 1,
            max_attempts: 5,
            ready: false,
        }));

        let message = rx.try_recv().unwrap();
        assert_eq!(message.meta.source, EventSource::Runtime);
        assert_eq!(message.meta.level, EventLevel::Debug);
    }

    #[test]
    fn test_spawn_and_install_failures_log_below_error() {
        let spawn = AppEvent::Platform(PlatformEvent::ProcessExecutionFailed {
            command: "podman".into(),
            error_message: "command not found: podman".into(),
            duration_ms: 0,
        });
        assert_eq!(spawn.log_level(), tracing::Level::DEBUG);

        let err = InstallError::MissingDashboardDomain;
        let failed = AppEvent::Install(InstallEvent::Failed {
            failure: FailureContext::from_error(&err),
        });
        assert_eq!(failed.log_level(), tracing::Level::DEBUG);

        let step = AppEvent::Containers(ContainersEvent::StepFailed {
            runtime: ContainerRuntime::Docker,
            step: ContainerStep::Up,
            failure: FailureContext::from_error(&err),
        });
        assert_eq!(step.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_failure_context_from_error() {
        let err = InstallError::PortOccupied {
            port: 80,
            message: "address in use".into(),
        };
        let failure = FailureContext::from_error(&err);
        assert_eq!(failure.code.as_deref(), Some("install.port_occupied"));
        assert!(failure.hint.is_some());
        assert!(!failure.retryable);
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = AppEvent::Containers(ContainersEvent::StepCompleted {
            runtime: ContainerRuntime::Podman,
            step: ContainerStep::Pull,
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["domain"], "containers");
        assert_eq!(json["event"]["type"], "StepCompleted");
        assert_eq!(json["event"]["runtime"], "podman");
        assert_eq!(json["event"]["step"], "pull");
    }
}
