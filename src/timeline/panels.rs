//! Read-only summary panels over a commit subset.
//!
//! - `summarize`: stats box
//! - `file_breakdown`: per-file line counts with a dot per line
//! - `category_legend`: lines per category
//!
//! All three return an explicit empty/zero state for an empty subset.

use std::collections::HashMap;

use crate::models::{CategoryEntry, FileDot, FileEntry, StatsPanel};
use crate::timeline::aggregate::Commit;

const TABLEAU10: [&str; 10] = [
    "#4e79a7", "#f28e2c", "#e15759", "#76b7b2", "#59a14f",
    "#edc949", "#af7aa1", "#ff9da7", "#9c755f", "#bab0ab",
];

/// Ordinal category colors, assigned by first appearance across the whole
/// dataset so a category keeps its color under any filter.
#[derive(Debug, Clone, Default)]
pub struct CategoryPalette {
    slots: HashMap<String, usize>,
    order: Vec<String>,
}

impl CategoryPalette {
    pub fn from_commits(commits: &[Commit]) -> Self {
        let mut palette = Self::default();
        for line in commits.iter().flat_map(|c| c.lines()) {
            if !palette.slots.contains_key(&line.category) {
                palette.slots.insert(line.category.clone(), palette.order.len());
                palette.order.push(line.category.clone());
            }
        }
        palette
    }

    pub fn color(&self, category: &str) -> &'static str {
        let slot = self.slots.get(category).copied().unwrap_or(0);
        TABLEAU10[slot % TABLEAU10.len()]
    }

    pub fn categories(&self) -> &[String] {
        &self.order
    }
}

pub fn summarize(subset: &[&Commit]) -> StatsPanel {
    let lines = || subset.iter().flat_map(|c| c.lines());

    let mut per_file: HashMap<&str, usize> = HashMap::new();
    for line in lines() {
        *per_file.entry(line.file.as_str()).or_insert(0) += 1;
    }

    StatsPanel {
        commits: subset.len(),
        files: per_file.len(),
        total_lines: lines().count(),
        max_depth: lines().filter_map(|l| l.indent_depth).max(),
        max_line_length: lines().filter_map(|l| l.line_length).max(),
        max_file_lines: per_file.values().copied().max(),
    }
}

/// Files sorted by line count, largest first; ties keep first appearance.
pub fn file_breakdown(subset: &[&Commit], palette: &CategoryPalette) -> Vec<FileEntry> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut files: Vec<FileEntry> = Vec::new();

    for line in subset.iter().flat_map(|c| c.lines()) {
        let dot = FileDot {
            category: line.category.clone(),
            color: palette.color(&line.category).to_string(),
            line: line.line_number,
        };
        match index.get(line.file.as_str()) {
            Some(&i) => {
                files[i].lines += 1;
                files[i].dots.push(dot);
            }
            None => {
                index.insert(line.file.as_str(), files.len());
                files.push(FileEntry {
                    name: line.file.clone(),
                    lines: 1,
                    dots: vec![dot],
                });
            }
        }
    }

    files.sort_by(|a, b| b.lines.cmp(&a.lines));
    files
}

/// Categories in palette order, restricted to those present in the subset.
pub fn category_legend(subset: &[&Commit], palette: &CategoryPalette) -> Vec<CategoryEntry> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for line in subset.iter().flat_map(|c| c.lines()) {
        *counts.entry(line.category.as_str()).or_insert(0) += 1;
    }

    palette
        .categories()
        .iter()
        .filter_map(|category| {
            counts.get(category.as_str()).map(|&lines| CategoryEntry {
                category: category.clone(),
                lines,
                color: palette.color(category).to_string(),
            })
        })
        .collect()
}

/// Every panel computed from one subset in one pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryPanels {
    pub stats: StatsPanel,
    pub files: Vec<FileEntry>,
    pub categories: Vec<CategoryEntry>,
}

impl SummaryPanels {
    pub fn compute(subset: &[&Commit], palette: &CategoryPalette) -> Self {
        Self {
            stats: summarize(subset),
            files: file_breakdown(subset, palette),
            categories: category_legend(subset, palette),
        }
    }
}
