#[cfg(test)]
mod tests {
    use std::f64::consts::PI;
    use std::sync::Arc;

    use approx::assert_abs_diff_eq;

    use crate::feedback::{FeedbackEventKind, MarkerFeedback};
    use crate::kinematic_traits::Pose;
    use crate::tests::test_utils::{recorded_session, sample_arm, FakeSolver, HostCall};

    fn drag(marker_name: &str) -> MarkerFeedback {
        MarkerFeedback {
            marker_name: marker_name.to_string(),
            event_kind: FeedbackEventKind::PoseUpdate,
            pose: Pose::identity(),
        }
    }

    #[test]
    fn test_drag_commits_unwound_solution() {
        // The solver answers with the base joint wound up a full turn; the
        // committed configuration must be the near representative.
        let solver = FakeSolver::with_responses(vec![Some(vec![2.0 * PI + 0.3, 0.5, -0.2])]);
        let (mut session, _log, _published) = recorded_session(solver);
        session.load_model(Arc::new(sample_arm()));
        session.set_active_group(Some("arm"));

        session.process_feedback(&drag("tool0_controls"));

        let positions = session.command().positions();
        assert_abs_diff_eq!(positions[0], 0.3, epsilon = 1e-12);
        assert_abs_diff_eq!(positions[1], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(positions[2], -0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_ik_failure_leaves_configuration_untouched() {
        let (mut session, log, published) = recorded_session(FakeSolver::failing());
        session.load_model(Arc::new(sample_arm()));
        session.set_active_group(Some("arm"));
        session.set_variable(0, 0.7);

        let before = session.command().positions().to_vec();
        let host_calls_before = log.borrow().len();
        let publishes_before = published.borrow().len();

        session.process_feedback(&drag("tool0_controls"));

        // Bit-identical configuration, no refresh of any kind.
        assert_eq!(session.command().positions(), before.as_slice());
        assert_eq!(log.borrow().len(), host_calls_before);
        assert_eq!(published.borrow().len(), publishes_before);
    }

    #[test]
    fn test_keep_alive_is_a_no_op() {
        let solver = FakeSolver::with_responses(vec![Some(vec![1.0, 1.0, 1.0])]);
        let (mut session, log, _published) = recorded_session(solver);
        session.load_model(Arc::new(sample_arm()));
        session.set_active_group(Some("arm"));

        let before = session.command().positions().to_vec();
        let host_calls_before = log.borrow().len();

        session.process_feedback(&MarkerFeedback {
            marker_name: "tool0_controls".to_string(),
            event_kind: FeedbackEventKind::KeepAlive,
            pose: Pose::identity(),
        });

        assert_eq!(session.command().positions(), before.as_slice());
        assert_eq!(log.borrow().len(), host_calls_before);
    }

    #[test]
    fn test_reserved_events_are_ignored() {
        let solver = FakeSolver::with_responses(vec![Some(vec![1.0, 1.0, 1.0])]);
        let (mut session, _log, _published) = recorded_session(solver);
        session.load_model(Arc::new(sample_arm()));
        session.set_active_group(Some("arm"));
        let before = session.command().positions().to_vec();

        for kind in [FeedbackEventKind::MenuSelect, FeedbackEventKind::ButtonClick] {
            session.process_feedback(&MarkerFeedback {
                marker_name: "tool0_controls".to_string(),
                event_kind: kind,
                pose: Pose::identity(),
            });
        }
        assert_eq!(session.command().positions(), before.as_slice());
    }

    #[test]
    fn test_drag_without_active_group_is_reported_not_fatal() {
        let solver = FakeSolver::with_responses(vec![Some(vec![1.0, 1.0, 1.0])]);
        let (mut session, _log, _published) = recorded_session(solver);
        session.load_model(Arc::new(sample_arm()));

        let before = session.command().positions().to_vec();
        session.process_feedback(&drag("tool0_controls"));
        assert_eq!(session.command().positions(), before.as_slice());
    }

    #[test]
    fn test_drag_commits_only_group_variables() {
        // Dragging the forearm group must not disturb joints outside it.
        let solver = FakeSolver::with_responses(vec![Some(vec![0.9])]);
        let (mut session, _log, _published) = recorded_session(solver);
        session.load_model(Arc::new(sample_arm()));
        session.set_active_group(Some("arm"));
        session.set_variable(0, 0.4);
        session.set_variable(1, -0.3);

        session.set_active_group(Some("forearm"));
        session.process_feedback(&drag("tool0_controls"));

        let positions = session.command().positions();
        assert_abs_diff_eq!(positions[0], 0.4, epsilon = 1e-12);
        assert_abs_diff_eq!(positions[1], -0.3, epsilon = 1e-12);
        assert_abs_diff_eq!(positions[2], 0.9, epsilon = 1e-12);
    }

    #[test]
    fn test_malformed_solver_output_is_discarded() {
        // Wrong arity and non-finite values must both be rejected.
        for bad in [vec![0.1, 0.2], vec![f64::NAN, 0.0, 0.0]] {
            let solver = FakeSolver::with_responses(vec![Some(bad)]);
            let (mut session, _log, _published) = recorded_session(solver);
            session.load_model(Arc::new(sample_arm()));
            session.set_active_group(Some("arm"));
            let before = session.command().positions().to_vec();

            session.process_feedback(&drag("tool0_controls"));
            assert_eq!(session.command().positions(), before.as_slice());
        }
    }

    #[test]
    fn test_each_commit_refreshes_in_order() {
        // Three group variables committed means three pose pushes per handle
        // pair, in mutation order.
        let solver = FakeSolver::with_responses(vec![Some(vec![0.1, 0.2, 0.3])]);
        let (mut session, log, _published) = recorded_session(solver);
        session.load_model(Arc::new(sample_arm()));
        session.set_active_group(Some("arm"));
        log.borrow_mut().clear();

        session.process_feedback(&drag("tool0_controls"));

        let pushes = log
            .borrow()
            .iter()
            .filter(|c| matches!(c, HostCall::SetPose(_)))
            .count();
        assert_eq!(pushes, 3 * session.markers().handle_names().len());
    }
}
