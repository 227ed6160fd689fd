use alfra_engine::db_types::{NewProfile, Role};
use cucumber::given;

use crate::cucumber::{world::MirrorSystem, AlfraWorld};

#[given("a fresh install")]
async fn fresh_database(world: &mut AlfraWorld) {
    let system = MirrorSystem::new().await;
    world.system = Some(system);
}

#[given(expr = "a(n) {word} profile {string}")]
async fn profile(world: &mut AlfraWorld, role: String, id: String) {
    let role = role.parse::<Role>().expect("Not a valid role");
    let profile = NewProfile::new(id, role);
    world.system().profile_api.upsert_profile(profile).await.expect("Error creating profile");
}
