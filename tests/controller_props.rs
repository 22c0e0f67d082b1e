//! Property tests for facing bookkeeping
//!
//! Run with: cargo test --test controller_props

use capture_bridge::testing::MockSessionFactory;
use capture_bridge::{BridgeConfig, CameraController, CameraFacing};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Op {
    Switch,
    FailedSwitch,
    Notify,
    Sync(bool),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Switch),
        Just(Op::FailedSwitch),
        Just(Op::Notify),
        any::<bool>().prop_map(Op::Sync),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn toggling_twice_is_identity(front in any::<bool>()) {
        let facing = CameraFacing::from_front(front);
        prop_assert_eq!(facing.toggled().toggled(), facing);
        prop_assert_ne!(facing.toggled(), facing);
    }

    /// Facing follows a simple model; only causal switches reach the hardware
    #[test]
    fn facing_tracks_operation_model(
        start_front in any::<bool>(),
        ops in prop::collection::vec(op_strategy(), 0..24),
    ) {
        let factory = MockSessionFactory::new();
        let mut config = BridgeConfig::default();
        config.camera.default_facing = CameraFacing::from_front(start_front);
        let controller = CameraController::with_config("prop-session", &factory, &config).unwrap();

        let mut expected = CameraFacing::from_front(start_front);
        let mut expected_switch_calls = 0usize;

        for op in ops {
            match op {
                Op::Switch => {
                    factory.fail_switches(false);
                    let facing = controller.switch_camera().unwrap();
                    expected = expected.toggled();
                    expected_switch_calls += 1;
                    prop_assert_eq!(facing, expected);
                }
                Op::FailedSwitch => {
                    factory.fail_switches(true);
                    prop_assert!(controller.switch_camera().is_err());
                    expected_switch_calls += 1;
                }
                Op::Notify => {
                    controller.notify_camera_switch();
                    expected = expected.toggled();
                }
                Op::Sync(front) => {
                    controller.sync_camera_facing(CameraFacing::from_front(front));
                    expected = CameraFacing::from_front(front);
                }
            }
            prop_assert_eq!(controller.facing(), expected);
        }

        prop_assert_eq!(factory.switch_calls(), expected_switch_calls);

        controller.dispose();
        controller.dispose();
        prop_assert_eq!(factory.release_calls(), 1);
    }
}
