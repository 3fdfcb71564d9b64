// Pipelines: the two things a user actually runs.
//
// embed:   dataset → filter → seeded sample → one provider request → SQLite
// analyze: stored matrix → (similarity rankings ‖ PCA projection)

pub mod analyze;
pub mod embed;
