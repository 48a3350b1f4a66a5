use directories::ProjectDirs;
use std::path::PathBuf;

pub fn data_root() -> PathBuf {
    if let Some(pd) = ProjectDirs::from("com", "recall", "Recall") {
        pd.data_dir().to_path_buf()
    } else {
        // Fallback: current dir
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    }
}

pub fn config_root() -> PathBuf {
    ProjectDirs::from("com", "recall", "Recall")
        .map(|pd| pd.config_dir().to_path_buf())
        .unwrap_or_else(data_root)
}

pub fn default_store_file() -> PathBuf {
    data_root().join("cards.json")
}
