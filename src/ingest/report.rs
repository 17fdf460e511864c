//! Age distribution reporting

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};

/// Age range used for distribution reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeBucket {
    /// age < 20
    #[serde(rename = "<20")]
    Under20,
    /// 20 <= age <= 40
    #[serde(rename = "20-40")]
    From20To40,
    /// 40 < age <= 60
    #[serde(rename = "40-60")]
    From40To60,
    /// age > 60
    #[serde(rename = ">60")]
    Over60,
}

impl AgeBucket {
    /// All buckets in report order
    pub const ALL: [AgeBucket; 4] = [
        AgeBucket::Under20,
        AgeBucket::From20To40,
        AgeBucket::From40To60,
        AgeBucket::Over60,
    ];

    pub fn classify(age: i32) -> Self {
        if age < 20 {
            AgeBucket::Under20
        } else if age <= 40 {
            AgeBucket::From20To40
        } else if age <= 60 {
            AgeBucket::From40To60
        } else {
            AgeBucket::Over60
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgeBucket::Under20 => "<20",
            AgeBucket::From20To40 => "20-40",
            AgeBucket::From40To60 => "40-60",
            AgeBucket::Over60 => ">60",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for AgeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Bucket counts over a set of ages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeDistribution {
    counts: [usize; 4],
}

impl AgeDistribution {
    pub fn from_ages(ages: impl IntoIterator<Item = i32>) -> Self {
        let mut distribution = Self::default();
        for age in ages {
            distribution.counts[AgeBucket::classify(age).index()] += 1;
        }
        distribution
    }

    pub fn count(&self, bucket: AgeBucket) -> usize {
        self.counts[bucket.index()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Share of `bucket` in percent, rounded to two decimals
    ///
    /// An empty distribution has nothing to divide by and reports 0 for
    /// every bucket.
    pub fn percentage(&self, bucket: AgeBucket) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let pct = self.count(bucket) as f64 / total as f64 * 100.0;
        (pct * 100.0).round() / 100.0
    }

    /// Percentages in report order
    pub fn percentages(&self) -> Vec<(AgeBucket, f64)> {
        AgeBucket::ALL
            .iter()
            .map(|&bucket| (bucket, self.percentage(bucket)))
            .collect()
    }

    /// One `<label>: <percent>%` line per bucket, in report order
    pub fn lines(&self) -> Vec<String> {
        self.percentages()
            .into_iter()
            .map(|(bucket, pct)| format!("{}: {:.2}%", bucket, pct))
            .collect()
    }
}

impl fmt::Display for AgeDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Age-Group % Distribution:")?;
        for line in self.lines() {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Write the report block, preceded by one blank line, to `out`
pub fn write_report(out: &mut impl Write, distribution: &AgeDistribution) -> io::Result<()> {
    write!(out, "\n{}", distribution)?;
    out.flush()
}
