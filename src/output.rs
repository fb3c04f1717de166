//! Writing declaration files next to hand-authored augmentations.
//!
//! - `<lib>.d.ts` / `<lib>.globals.d.ts` are generated and always overwritten
//! - `<lib>.augment.d.ts` is created once as a stub and never touched again
//!
//! Generated files never read or merge the augmentation file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::emit::Declarations;

pub struct OutputWriter {
    dir: PathBuf,
    /// Whether to create augmentation stubs at all.
    augmentation_stubs: bool,
}

impl OutputWriter {
    pub fn new(dir: impl Into<PathBuf>, augmentation_stubs: bool) -> Self {
        Self {
            dir: dir.into(),
            augmentation_stubs,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the generated file for `decls`.
    pub fn declaration_path(&self, decls: &Declarations) -> PathBuf {
        self.dir
            .join(format!("{}.{}", decls.library, decls.flavor.file_suffix()))
    }

    /// Path of the hand-editable augmentation file for `library`.
    pub fn augmentation_path(&self, library: &str) -> PathBuf {
        self.dir.join(format!("{library}.augment.d.ts"))
    }

    /// Write one library's declarations, creating the output directory and
    /// the augmentation stub as needed.
    pub fn write(&self, decls: &Declarations) -> io::Result<WriteResult> {
        fs::create_dir_all(&self.dir)?;

        let gen_path = self.declaration_path(decls);
        fs::write(&gen_path, &decls.text)?;

        if !self.augmentation_stubs {
            return Ok(WriteResult {
                gen_path,
                augment_path: None,
                augment_created: false,
            });
        }

        let augment_path = self.augmentation_path(&decls.library);
        let augment_created = if !augment_path.exists() {
            fs::write(&augment_path, augmentation_stub(&decls.library))?;
            true
        } else {
            false
        };
        debug!(
            path = %gen_path.display(),
            augment_created,
            "wrote declarations"
        );

        Ok(WriteResult {
            gen_path,
            augment_path: Some(augment_path),
            augment_created,
        })
    }
}

fn augmentation_stub(library: &str) -> String {
    format!(
        "// Hand-written additions to the {library} declarations.\n\
         // This file is created once and preserved across regeneration.\n\
         // Use `declare module \"...\"` blocks to augment generated modules.\n\n\
         export {{}};\n"
    )
}

#[derive(Debug)]
pub struct WriteResult {
    /// The generated file (always written).
    pub gen_path: PathBuf,
    /// The augmentation file, if stubs are enabled.
    pub augment_path: Option<PathBuf>,
    /// Whether the augmentation stub was created by this write.
    pub augment_created: bool,
}
