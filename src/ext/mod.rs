// Extension traits for third-party types live under `crate::ext`.

pub mod serde_json;
