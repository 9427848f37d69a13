use std::fmt;

/// Cross-tabulation of the two groups' category choices.
///
/// Rows are the first group, columns the second. Categories are sorted, the
/// unset category first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContingencyTable {
    categories: Vec<Option<String>>,
    counts: Vec<Vec<usize>>,
}

impl ContingencyTable {
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a Option<String>, &'a Option<String>)>,
    {
        let pairs: Vec<_> = pairs.into_iter().collect();
        let mut categories: Vec<Option<String>> = pairs
            .iter()
            .flat_map(|(a, b)| [(*a).clone(), (*b).clone()])
            .collect();
        categories.sort();
        categories.dedup();

        let mut counts = vec![vec![0; categories.len()]; categories.len()];
        for (a, b) in pairs {
            if let (Ok(row), Ok(col)) = (categories.binary_search(a), categories.binary_search(b)) {
                counts[row][col] += 1;
            }
        }
        Self { categories, counts }
    }

    pub fn categories(&self) -> &[Option<String>] {
        &self.categories
    }

    /// Items where the first group chose `row` and the second `col`.
    pub fn count(&self, row: &Option<String>, col: &Option<String>) -> usize {
        match (self.categories.binary_search(row), self.categories.binary_search(col)) {
            (Ok(row), Ok(col)) => self.counts[row][col],
            _ => 0,
        }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    fn row_total(&self, idx: usize) -> usize {
        self.counts[idx].iter().sum()
    }

    fn col_total(&self, idx: usize) -> usize {
        self.counts.iter().map(|row| row[idx]).sum()
    }

    /// Share of items both groups put in the same category. NaN without items.
    pub fn observed_agreement(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return f64::NAN;
        }
        let diagonal: usize = (0..self.categories.len()).map(|i| self.counts[i][i]).sum();
        diagonal as f64 / total as f64
    }

    /// Agreement expected by chance from the marginals. NaN without items.
    pub fn expected_agreement(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return f64::NAN;
        }
        let n = total as f64;
        (0..self.categories.len())
            .map(|i| (self.row_total(i) as f64 / n) * (self.col_total(i) as f64 / n))
            .sum()
    }

    /// Cohen's kappa, `(po - pe) / (1 - pe)`.
    ///
    /// NaN without items and when chance agreement is already certain.
    pub fn kappa(&self) -> f64 {
        let po = self.observed_agreement();
        let pe = self.expected_agreement();
        if po.is_nan() || pe == 1.0 {
            return f64::NAN;
        }
        (po - pe) / (1.0 - pe)
    }
}

const CORNER: &str = "A\\B";

pub(crate) fn category_label(category: &Option<String>) -> &str {
    category.as_deref().unwrap_or("<unset>")
}

impl fmt::Display for ContingencyTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.categories.iter().map(category_label).collect();
        let width = labels
            .iter()
            .map(|l| l.chars().count())
            .chain(std::iter::once(CORNER.len()))
            .chain(self.counts.iter().flatten().map(|c| c.to_string().len()))
            .max()
            .unwrap_or(0);

        write!(f, "{:width$}", CORNER, width = width)?;
        for label in &labels {
            write!(f, " {:>width$}", label, width = width)?;
        }
        for (label, row) in labels.iter().zip(&self.counts) {
            write!(f, "\n{:width$}", label, width = width)?;
            for count in row {
                write!(f, " {:>width$}", count, width = width)?;
            }
        }
        Ok(())
    }
}
