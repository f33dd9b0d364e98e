use logbook::NoopLogbook;
use std::sync::Arc;

#[test]
fn default_init() {
    logbook::init_once(Arc::new(NoopLogbook), Default::default());

    // Without an explicit max level or filter the facade is left wide open
    // and the backend's own threshold is the effective gate.
    assert_eq!(log::max_level(), log::LevelFilter::Trace);
}
