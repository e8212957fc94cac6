//! When step definitions

use cucumber::when;

use crate::world::CotejoWorld;

#[when("the law is reconciled")]
fn reconcile_law(world: &mut CotejoWorld) {
    world.run_reconciliation();
}

#[when("the law is reconciled again")]
fn reconcile_again(world: &mut CotejoWorld) {
    world.run_reconciliation();
}
