/// Tables and columns the accessor requires. Checked once at open time;
/// the store itself is built offline and never written by this crate.
pub const REQUIRED: &[(&str, &[&str])] = &[
    (
        "captions",
        &["obs_uid", "usr_uid", "start_time", "caption", "img_uid"],
    ),
    ("images", &["img_uid", "img_path"]),
    ("clicks", &["click_id", "obs_uid", "x", "y", "click_time"]),
];

/// Layout of the distributed store. Used by tests to build fixture
/// databases; production stores ship pre-populated.
pub const SCHEMA: &str = r#"
-- Captions table: one row per image-caption pair shown to a participant
CREATE TABLE IF NOT EXISTS captions (
    obs_uid TEXT PRIMARY KEY,
    usr_uid TEXT NOT NULL,
    start_time TEXT NOT NULL,
    caption TEXT NOT NULL,
    img_uid TEXT NOT NULL
);

-- Images table: stimulus image lookup
CREATE TABLE IF NOT EXISTS images (
    img_uid TEXT PRIMARY KEY,
    img_path TEXT NOT NULL
);

-- Clicks table: click path recorded during an observation
CREATE TABLE IF NOT EXISTS clicks (
    click_id INTEGER NOT NULL,
    obs_uid TEXT NOT NULL,
    x INTEGER NOT NULL,
    y INTEGER NOT NULL,
    click_time TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_clicks_obs_uid ON clicks(obs_uid);
"#;
