//! Column-metadata extract builders

#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// Extract line for a categorical variable
pub fn categorical_line(path: &str, values: &[&str]) -> String {
    format!(
        "\"{}\",4,0,true,{},null,null,0,0,10,5",
        path,
        values.join("µ")
    )
}

/// Extract line for a continuous variable
pub fn continuous_line(path: &str, min: f64, max: f64) -> String {
    format!("\"{}\",8,0,false,,{},{},0,0,10,5", path, min, max)
}

/// Write extract lines to `<dir>/<name>`
pub fn write_extract(dir: &Path, name: &str, lines: &[String]) -> PathBuf {
    let path = dir.join(name);
    let mut contents = lines.join("\n");
    contents.push('\n');
    std::fs::write(&path, contents).expect("Failed to write extract");
    path
}
