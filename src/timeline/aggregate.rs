//! Groups line records into commits.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, FixedOffset, Timelike, Utc};

use crate::models::{CommitSummary, FileLineCount};
use crate::timeline::record::LineRecord;

/// Every line record sharing one commit id, plus metrics derived once at
/// aggregation time.
///
/// There is no `Serialize` impl. The wire form is the allow-listed
/// [`CommitSummary`], which leaves `lines` out.
#[derive(Debug, Clone)]
pub struct Commit {
    pub id: String,
    pub author: String,
    pub date: String,
    pub time: String,
    pub timezone: String,
    pub authored_at: DateTime<FixedOffset>,
    pub hour_of_day: f64,
    pub total_lines: usize,
    lines: Vec<LineRecord>,
}

impl Commit {
    /// Builds a commit from its group; the first record supplies author and
    /// timestamp. Returns `None` for an empty group.
    fn from_group(lines: Vec<LineRecord>) -> Option<Self> {
        let first = lines.first()?;
        Some(Self {
            id: first.commit_id.clone(),
            author: first.author.clone(),
            date: first.date.clone(),
            time: first.time.clone(),
            timezone: first.timezone.clone(),
            authored_at: first.authored_at,
            hour_of_day: hour_of_day(&first.authored_at),
            total_lines: lines.len(),
            lines,
        })
    }

    pub fn lines(&self) -> &[LineRecord] {
        &self.lines
    }

    pub fn authored_utc(&self) -> DateTime<Utc> {
        self.authored_at.with_timezone(&Utc)
    }

    pub fn url(&self, repo_url: &str) -> String {
        format!("{}/commit/{}", repo_url.trim_end_matches('/'), self.id)
    }

    pub fn file_count(&self) -> usize {
        self.lines
            .iter()
            .map(|line| line.file.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Line counts per file, in order of first appearance.
    pub fn file_line_counts(&self) -> Vec<FileLineCount> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut counts: Vec<FileLineCount> = Vec::new();
        for line in &self.lines {
            match index.get(line.file.as_str()) {
                Some(&i) => counts[i].lines += 1,
                None => {
                    index.insert(line.file.as_str(), counts.len());
                    counts.push(FileLineCount {
                        file: line.file.clone(),
                        filename: line.filename.clone(),
                        lines: 1,
                    });
                }
            }
        }
        counts
    }

    pub fn summary(&self, repo_url: &str) -> CommitSummary {
        CommitSummary {
            id: self.id.clone(),
            url: self.url(repo_url),
            author: self.author.clone(),
            date: self.date.clone(),
            time: self.time.clone(),
            timezone: self.timezone.clone(),
            authored_at: self.authored_at.to_rfc3339(),
            hour_of_day: self.hour_of_day,
            total_lines: self.total_lines,
        }
    }
}

/// Author-local wall clock hour with minutes as a fraction.
pub fn hour_of_day(instant: &DateTime<FixedOffset>) -> f64 {
    instant.hour() as f64 + instant.minute() as f64 / 60.0
}

/// Groups `lines` by commit id. Commits come out in order of each id's first
/// appearance; lines within a commit keep their input order.
pub fn aggregate(lines: Vec<LineRecord>) -> Vec<Commit> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Vec<LineRecord>> = Vec::new();

    for line in lines {
        match index.get(&line.commit_id) {
            Some(&i) => groups[i].push(line),
            None => {
                index.insert(line.commit_id.clone(), groups.len());
                groups.push(vec![line]);
            }
        }
    }

    groups.into_iter().filter_map(Commit::from_group).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::record::fixtures::line;

    fn sample() -> Vec<LineRecord> {
        vec![
            line("b", "src/app.rs", "rs", "2024-05-04T09:00:00+00:00"),
            line("a", "src/lib.rs", "rs", "2024-05-03T23:30:00+00:00"),
            line("b", "style.css", "css", "2024-05-04T09:00:00+00:00"),
            line("c", "index.html", "html", "2024-05-05T00:15:00+00:00"),
            line("a", "src/lib.rs", "rs", "2024-05-03T23:30:00+00:00"),
            line("b", "src/app.rs", "rs", "2024-05-04T09:00:00+00:00"),
        ]
    }

    #[test]
    fn test_groups_in_first_appearance_order() {
        let commits = aggregate(sample());
        let ids: Vec<&str> = commits.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_partitions_every_line_exactly_once() {
        let input = sample();
        let total = input.len();
        let commits = aggregate(input);

        assert_eq!(commits.iter().map(|c| c.total_lines).sum::<usize>(), total);
        for commit in &commits {
            assert_eq!(commit.total_lines, commit.lines().len());
            assert!(commit.lines().iter().all(|l| l.commit_id == commit.id));
        }

        let unique: HashSet<&str> = commits.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(unique.len(), commits.len());
    }

    #[test]
    fn test_lines_keep_input_order() {
        let commits = aggregate(sample());
        let files: Vec<&str> = commits[0].lines().iter().map(|l| l.file.as_str()).collect();
        assert_eq!(files, vec!["src/app.rs", "style.css", "src/app.rs"]);
    }

    #[test]
    fn test_reaggregation_is_idempotent() {
        let commits = aggregate(sample());
        for commit in &commits {
            let again = aggregate(commit.lines().to_vec());
            assert_eq!(again.len(), 1);
            assert_eq!(again[0].total_lines, commit.total_lines);
            assert_eq!(again[0].hour_of_day, commit.hour_of_day);
        }
    }

    #[test]
    fn test_derived_fields() {
        let commits = aggregate(sample());
        let a = &commits[1];
        assert_eq!(a.hour_of_day, 23.5);
        assert_eq!(a.file_count(), 1);
        assert_eq!(commits[0].file_count(), 2);
        assert_eq!(
            a.url("https://github.com/org/repo/"),
            "https://github.com/org/repo/commit/a"
        );

        let counts = commits[0].file_line_counts();
        assert_eq!(counts[0].file, "src/app.rs");
        assert_eq!(counts[0].lines, 2);
        assert_eq!(counts[1].lines, 1);
    }

    #[test]
    fn test_summary_excludes_lines() {
        let commits = aggregate(sample());
        let json = serde_json::to_value(commits[0].summary("https://example.com")).unwrap();
        assert!(json.get("lines").is_none());
        assert_eq!(json["total_lines"], 3);
        assert_eq!(json["url"], "https://example.com/commit/b");
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate(Vec::new()).is_empty());
    }
}
