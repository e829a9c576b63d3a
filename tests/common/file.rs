use derive_new::new;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct FileSpec {
    pub path: PathBuf,
    pub content: String,
}

pub fn write_file(file: FileSpec) {
    if let Some(parent) = file.path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent directory");
    }

    std::fs::write(&file.path, file.content).expect("Failed to write file");
}

/// Write `files_count` files with fake names and content directly under `dir`
pub fn write_generated_files(dir: &Path, files_count: usize) -> Vec<FileSpec> {
    use fake::Fake;
    use fake::faker::lorem::en::{Word, Words};

    (0..files_count)
        .map(|i| {
            let file_name = format!("{}-{i}.txt", Word().fake::<String>());
            let content = Words(5..10).fake::<Vec<String>>().join(" ");
            let file = FileSpec::new(dir.join(file_name), content);
            write_file(file.clone());
            file
        })
        .collect()
}
