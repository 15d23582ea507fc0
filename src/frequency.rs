//! Top-N word frequencies, overall or split by increase/decrease.

use log::info;
use serde::Serialize;

use crate::config::PipelineConfig;
use crate::dataset::{self, Dataset, EmissionsChange, RegionFilter};
use crate::error::{Error, Result};
use crate::matrix::FrequencyMatrix;
use crate::normalize::{NormalizeOptions, Normalizer};
use crate::source::DataSource;

/// Row of the category matrix that ranks and divides.
const ALL_ROW: usize = 0;
const DECREASE_ROW: usize = 1;
const INCREASE_ROW: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FrequencyView {
    /// Nothing survived filtering and normalization.
    NoData,
    /// Years without an increase/decrease category: raw counts.
    Overall { labels: Vec<String>, counts: Vec<u64> },
    /// Share of each word's occurrences found in increase- and
    /// decrease-labelled reasons, plus the share of all words from each.
    ByCategory {
        labels: Vec<String>,
        increase: Vec<f64>,
        decrease: Vec<f64>,
        baseline_increase: f64,
        baseline_decrease: f64,
    },
}

impl FrequencyView {
    pub fn is_no_data(&self) -> bool {
        matches!(self, FrequencyView::NoData)
    }

    pub fn labels(&self) -> &[String] {
        match self {
            FrequencyView::NoData => &[],
            FrequencyView::Overall { labels, .. } | FrequencyView::ByCategory { labels, .. } => {
                labels
            }
        }
    }
}

/// Loads `year` for `region` and assembles its frequency view.
pub fn build_frequency_view(
    source: &dyn DataSource,
    config: &PipelineConfig,
    year: u16,
    region: RegionFilter,
    top_n: usize,
) -> Result<FrequencyView> {
    if top_n == 0 {
        return Err(Error::InvalidTopN);
    }
    let dataset = dataset::load(source, config, year, region)?;
    let view = frequency_view_from(&dataset, config, top_n)?;
    info!(
        "Frequency view for {} / {} - words={}",
        year,
        region,
        view.labels().len()
    );
    Ok(view)
}

/// Assembles the frequency view of an already loaded dataset.
pub fn frequency_view_from(
    dataset: &Dataset,
    config: &PipelineConfig,
    top_n: usize,
) -> Result<FrequencyView> {
    if top_n == 0 {
        return Err(Error::InvalidTopN);
    }
    if dataset.fragments.is_empty() {
        return Ok(FrequencyView::NoData);
    }

    if !dataset.has_change_category() {
        let matrix = FrequencyMatrix::build(&dataset.fragments);
        if matrix.is_empty() {
            return Ok(FrequencyView::NoData);
        }
        let (labels, counts) = matrix.top_total(top_n).into_iter().unzip();
        return Ok(FrequencyView::Overall { labels, counts });
    }

    let normalizer = Normalizer::new(
        config.category_collection_words.iter().cloned(),
        NormalizeOptions::FULL,
    );
    let increase =
        normalizer.process_all(&dataset.reasons_with(&EmissionsChange::Increased)).join(" ");
    let decrease =
        normalizer.process_all(&dataset.reasons_with(&EmissionsChange::Decreased)).join(" ");
    let all = dataset.fragments.join(" ");

    let matrix = FrequencyMatrix::build(&[all.as_str(), decrease.as_str(), increase.as_str()]);
    let all_words = word_count(&all);
    if matrix.is_empty() || all_words == 0 {
        return Ok(FrequencyView::NoData);
    }

    let (Some(all_row), Some(decrease_row), Some(increase_row)) = (
        matrix.row(ALL_ROW),
        matrix.row(DECREASE_ROW),
        matrix.row(INCREASE_ROW),
    ) else {
        return Ok(FrequencyView::NoData);
    };

    let columns = matrix.top_columns(ALL_ROW, top_n);
    let share = |row: &[u64], column: usize| match all_row[column] {
        0 => 0.0,
        denominator => row[column] as f64 / denominator as f64,
    };

    Ok(FrequencyView::ByCategory {
        labels: columns
            .iter()
            .map(|&column| matrix.vocabulary()[column].clone())
            .collect(),
        increase: columns.iter().map(|&c| share(increase_row, c)).collect(),
        decrease: columns.iter().map(|&c| share(decrease_row, c)).collect(),
        baseline_increase: word_count(&increase) as f64 / all_words as f64,
        baseline_decrease: word_count(&decrease) as f64 / all_words as f64,
    })
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DisclosureRecord;

    fn record(change: Option<&str>, reason: &str) -> DisclosureRecord {
        DisclosureRecord {
            country: Some("Chile".into()),
            region: Some("Latin America".into()),
            change: change.map(EmissionsChange::from_raw),
            reason: Some(reason.into()),
        }
    }

    fn dataset(year: u16, records: Vec<DisclosureRecord>) -> Dataset {
        let config = PipelineConfig::default();
        let normalizer = Normalizer::new(
            config.reason_collection_words.iter().cloned(),
            NormalizeOptions::FULL,
        );
        let lowered: Vec<String> = records
            .iter()
            .filter_map(|r| r.reason.as_deref())
            .map(str::to_lowercase)
            .collect();
        Dataset {
            year,
            fragments: normalizer.process_all(&lowered),
            records,
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn overall_counts_for_years_without_category() {
        let ds = dataset(
            2013,
            vec![record(None, "Cars and trucks"), record(None, "cars")],
        );
        let view = frequency_view_from(&ds, &PipelineConfig::default(), 13).unwrap();
        assert_eq!(
            view,
            FrequencyView::Overall {
                labels: vec!["car".into(), "truck".into()],
                counts: vec![2, 1],
            }
        );
    }

    #[test]
    fn shares_use_the_full_word_count_as_denominator() {
        let ds = dataset(
            2018,
            vec![
                record(Some("Increased"), "cars and trucks"),
                record(Some("Increased"), "cars"),
                record(Some("Decreased"), "cars"),
                record(Some("Decreased"), "solar"),
            ],
        );
        let view = frequency_view_from(&ds, &PipelineConfig::default(), 2).unwrap();
        let FrequencyView::ByCategory {
            labels,
            increase,
            decrease,
            baseline_increase,
            baseline_decrease,
        } = view
        else {
            panic!("expected a category split");
        };
        // solar and truck tie at 1; vocabulary order decides
        assert_eq!(labels, vec!["car", "solar"]);
        assert!(close(increase[0], 2.0 / 3.0));
        assert!(close(decrease[0], 1.0 / 3.0));
        assert!(close(increase[1], 0.0));
        assert!(close(decrease[1], 1.0));
        // 3 of 5 words are from increase reasons, 2 from decrease
        assert!(close(baseline_increase, 0.6));
        assert!(close(baseline_decrease, 0.4));
    }

    #[test]
    fn shares_stay_within_unit_interval() {
        let ds = dataset(
            2016,
            vec![
                record(Some("Increased"), "City growth and new city buildings"),
                record(Some("Decreased"), "Building retrofits in the city"),
                record(Some("This is our first year of calculation"), "new methodology"),
                record(Some("Decreased"), "Cleaner grid electricity"),
            ],
        );
        let view = frequency_view_from(&ds, &PipelineConfig::default(), 50).unwrap();
        let FrequencyView::ByCategory {
            labels,
            increase,
            decrease,
            ..
        } = view
        else {
            panic!("expected a category split");
        };
        assert!(!labels.is_empty());
        for (inc, dec) in increase.iter().zip(&decrease) {
            assert!((0.0..=1.0).contains(inc));
            assert!((0.0..=1.0).contains(dec));
            assert!(inc + dec <= 1.0 + 1e-12);
        }
        // "city" is counted overall but stripped from the split texts
        let city = labels.iter().position(|l| l == "city").unwrap();
        assert_eq!(increase[city], 0.0);
        assert_eq!(decrease[city], 0.0);
    }

    #[test]
    fn empty_dataset_is_no_data() {
        let config = PipelineConfig::default();
        for year in [2014, 2019] {
            let view = frequency_view_from(&dataset(year, Vec::new()), &config, 5).unwrap();
            assert!(view.is_no_data());
        }
        // reasons made only of filler words
        let filler = dataset(2019, vec![record(Some("Increased"), "emissions increased")]);
        assert!(frequency_view_from(&filler, &config, 5).unwrap().is_no_data());
    }

    #[test]
    fn zero_top_n_is_rejected() {
        let ds = dataset(2013, vec![record(None, "cars")]);
        assert!(matches!(
            frequency_view_from(&ds, &PipelineConfig::default(), 0),
            Err(Error::InvalidTopN)
        ));
    }

    #[test]
    fn no_data_serializes_with_kind_tag() {
        assert_eq!(
            serde_json::to_string(&FrequencyView::NoData).unwrap(),
            r#"{"kind":"no_data"}"#
        );
    }
}
