mod plan;

pub use plan::{plan_install, plan_install_from_index};
