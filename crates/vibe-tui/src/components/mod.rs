pub mod admin;
pub mod bio;
pub mod bottom_nav;
pub mod floating_player;
pub mod help_overlay;
pub mod song_detail;
pub mod song_list;
pub mod welcome;
