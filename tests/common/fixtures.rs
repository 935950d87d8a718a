//! Reusable file contents

/// Single project: `src` → `dist`
pub const TSCONFIG_SRC_DIST: &str = r#"{
  // comments are allowed
  "compilerOptions": {
    "rootDir": "src",
    "outDir": "dist",
  },
}
"#;

/// Single project excluding `src/fixtures`
pub const TSCONFIG_WITH_EXCLUDE: &str = r#"{
  "compilerOptions": { "rootDir": "src", "outDir": "dist" },
  "exclude": ["src/fixtures"]
}
"#;

/// Solution file referencing two packages
pub const TSCONFIG_SOLUTION: &str = r#"{
  "files": [],
  "references": [{ "path": "packages/core" }, { "path": "packages/app" }]
}
"#;

/// Package config with its input and output next to it
pub const TSCONFIG_PACKAGE: &str = r#"{
  "extends": "../../tsconfig.base.json",
  "compilerOptions": { "rootDir": "src", "outDir": "lib" }
}
"#;

pub const TSCONFIG_BASE: &str = r#"{
  "compilerOptions": { "strict": true }
}
"#;

/// Missing `outDir`
pub const TSCONFIG_NO_OUT_DIR: &str = r#"{ "compilerOptions": { "rootDir": "src" } }"#;
