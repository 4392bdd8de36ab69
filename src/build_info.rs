use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct BuildInfo {
    pub name: String,
    pub version: &'static str,
    pub git_describe: &'static str,
    pub git_hash: &'static str,
}

impl BuildInfo {
    pub fn new(name: &str) -> Self {
        BuildInfo {
            name: name.to_string(),
            version: env!("CARGO_PKG_VERSION"),
            git_describe: env!("GIT_DESCRIBE"),
            git_hash: env!("GIT_HASH"),
        }
    }
}

pub fn print_report(name: &str) {
    match serde_json::to_string_pretty(&BuildInfo::new(name)) {
        Ok(report) => println!("{report}"),
        Err(e) => eprintln!("failed to serialize build info: {e}"),
    }
}
