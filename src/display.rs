//! Text report of a diff result.

use std::fmt::{self, Write};

use unicode_width::UnicodeWidthStr;

use crate::configuration::ConfigurationSet;
use crate::result::DiffResult;
use crate::revisions::GroupedRevisions;

/// Convert a zero-based index to a base-26 label: A, B, ..., Z, AA, AB, ..., AZ, BA, ...
/// Similar to Excel column naming.
pub(crate) fn index_to_base26_label(mut n: usize) -> String {
    let mut result = String::new();
    loop {
        let remainder = n % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    result
}

/// Text report of a [`DiffResult`].
///
/// ```text
/// === Span [rev=0, type=POS, begin=0, end=4] -> AGREE COMPLETE
/// === Span [rev=0, type=POS, begin=5, end=10] -> DISAGREE COMPLETE
/// [A] alice #3
///     carol #3
/// [B] bob   #3
/// ```
pub struct DiffReport<'a> {
    result: &'a DiffResult,
    revisions: Option<&'a GroupedRevisions>,
}

impl<'a> DiffReport<'a> {
    pub fn new(result: &'a DiffResult) -> Self {
        DiffReport {
            result,
            revisions: None,
        }
    }

    /// Also render the representative record of each listed configuration.
    pub fn with_records(mut self, revisions: &'a GroupedRevisions) -> Self {
        self.revisions = Some(revisions);
        self
    }

    fn write_set(&self, f: &mut fmt::Formatter<'_>, set: &ConfigurationSet) -> fmt::Result {
        let labels: Vec<String> = (0..set.configurations().len())
            .map(|idx| format!("[{}]", index_to_base26_label(idx)))
            .collect();
        let label_width = labels.iter().map(|l| l.width()).max().unwrap_or(0);
        let group_width = set.groups().iter().map(|g| g.width()).max().unwrap_or(0);

        for (cfg, label) in set.configurations().iter().zip(&labels) {
            for (idx, (group, address)) in cfg.addresses().enumerate() {
                if idx == 0 {
                    f.write_str(label)?;
                    pad(f, label_width - label.width() + 1)?;
                } else {
                    pad(f, label_width + 1)?;
                }
                f.write_str(group)?;
                pad(f, group_width - group.width() + 1)?;
                writeln!(f, "{}", address)?;
            }
            if let Some(revisions) = self.revisions {
                pad(f, label_width + 1)?;
                match cfg.representative(revisions) {
                    Some(record) => writeln!(f, "= {}", record)?,
                    None => f.write_str("= <unresolved>\n")?,
                }
            }
        }
        Ok(())
    }
}

fn pad(f: &mut fmt::Formatter<'_>, n: usize) -> fmt::Result {
    for _ in 0..n {
        f.write_char(' ')?;
    }
    Ok(())
}

impl<'a> fmt::Display for DiffReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for set in self.result.configuration_sets() {
            // sets come from the result itself, so ownership checks cannot fail
            let agree = self.result.is_agreement(set).unwrap_or(false);
            let complete = self.result.is_complete(set).unwrap_or(false);
            writeln!(
                f,
                "=== {} -> {} {}",
                set.position(),
                if agree { "AGREE" } else { "DISAGREE" },
                if complete { "COMPLETE" } else { "INCOMPLETE" }
            )?;
            if !agree || !complete {
                self.write_set(f, set)?;
            }
        }
        Ok(())
    }
}
