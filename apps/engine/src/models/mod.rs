pub mod posting;
pub mod profile;
pub mod requirement;
pub mod shortlist;
