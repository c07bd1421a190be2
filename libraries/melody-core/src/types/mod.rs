mod ids;
mod track;

pub use ids::GuildId;
pub use track::Track;
