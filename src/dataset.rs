//! Loading one year of disclosure records into a canonical shape.
//!
//! Every yearly CDP snapshot names its columns differently. [`YearSchema`]
//! lists, per year, the dataset identifier and the raw column names accepted
//! for each canonical field; [`load`] is the single routine that consumes it:
//! fetch, rename, backfill regions, filter, drop incomplete rows, normalize.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord};
use log::{debug, info};
use serde::Serialize;

use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::normalize::{NormalizeOptions, Normalizer};
use crate::source::DataSource;

pub const FIRST_YEAR: u16 = 2013;
pub const LAST_YEAR: u16 = 2020;

pub const COUNTRY: &str = "country";
pub const REGION: &str = "region";
pub const CHANGE: &str = "increase_decrease_from_last_year";
pub const REASON: &str = "reason_for_increase_decrease_in_emissions";

/// Column layout of one yearly snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearSchema {
    pub year: u16,
    pub dataset: &'static str,
    /// Raw names accepted for the reason text, first match wins.
    pub reason: &'static [&'static str],
    /// Raw names for the increase/decrease category; `None` when the year
    /// has no such field.
    pub change: Option<&'static [&'static str]>,
    /// Raw names for a native region column; `None` means the region is
    /// backfilled from the country.
    pub region: Option<&'static [&'static str]>,
}

const REASON_NATIVE: &[&str] = &[REASON];
const REASON_FOR_CHANGE: &[&str] = &["reason_for_change"];
const REASON_PRIMARY: &[&str] = &["primary_reason_for_the_change"];
const CHANGE_NATIVE: &[&str] = &[CHANGE];
const CHANGE_IN_EMISSIONS: &[&str] = &["change_in_emissions"];
const CDP_REGION: &[&str] = &["cdp_region"];
const CDP_OR_PLAIN_REGION: &[&str] = &["cdp_region", REGION];

pub const YEAR_SCHEMAS: [YearSchema; 8] = [
    YearSchema {
        year: 2013,
        dataset: "qznk-mn6r",
        reason: REASON_FOR_CHANGE,
        change: None,
        region: None,
    },
    YearSchema {
        year: 2014,
        dataset: "imj3-eat7",
        reason: REASON_NATIVE,
        change: None,
        region: None,
    },
    YearSchema {
        year: 2015,
        dataset: "yasg-kzny",
        reason: REASON_NATIVE,
        change: Some(CHANGE_NATIVE),
        region: None,
    },
    YearSchema {
        year: 2016,
        dataset: "dfed-thx7",
        reason: REASON_NATIVE,
        change: Some(CHANGE_NATIVE),
        region: None,
    },
    YearSchema {
        year: 2017,
        dataset: "kyi6-dk5h",
        reason: REASON_NATIVE,
        change: Some(CHANGE_NATIVE),
        region: Some(CDP_OR_PLAIN_REGION),
    },
    YearSchema {
        year: 2018,
        dataset: "wii4-buw5",
        reason: REASON_FOR_CHANGE,
        change: Some(CHANGE_IN_EMISSIONS),
        region: Some(CDP_REGION),
    },
    YearSchema {
        year: 2019,
        dataset: "542d-zyj8",
        reason: REASON_FOR_CHANGE,
        change: Some(CHANGE_IN_EMISSIONS),
        region: Some(CDP_REGION),
    },
    YearSchema {
        year: 2020,
        dataset: "p43t-fbkj",
        reason: REASON_PRIMARY,
        change: Some(CHANGE_IN_EMISSIONS),
        region: Some(CDP_REGION),
    },
];

impl YearSchema {
    pub fn for_year(year: u16) -> Result<&'static YearSchema> {
        YEAR_SCHEMAS
            .iter()
            .find(|schema| schema.year == year)
            .ok_or(Error::UnsupportedYear(year))
    }

    pub fn has_change_category(&self) -> bool {
        self.change.is_some()
    }
}

/// A country → region lookup table taken from one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionLookup {
    pub dataset: &'static str,
    pub region: &'static [&'static str],
}

/// Merged in order; a later table overrides an earlier one.
pub const REGION_LOOKUPS: [RegionLookup; 2] = [
    RegionLookup {
        dataset: "p43t-fbkj",
        region: CDP_REGION,
    },
    RegionLookup {
        dataset: "kyi6-dk5h",
        region: &[REGION, "cdp_region"],
    },
];

/// The eight CDP reporting regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Region {
    Africa,
    EastAsia,
    Europe,
    LatinAmerica,
    MiddleEast,
    NorthAmerica,
    SouthAndWestAsia,
    SoutheastAsiaAndOceania,
}

impl Region {
    pub const ALL: [Region; 8] = [
        Region::Africa,
        Region::EastAsia,
        Region::Europe,
        Region::LatinAmerica,
        Region::MiddleEast,
        Region::NorthAmerica,
        Region::SouthAndWestAsia,
        Region::SoutheastAsiaAndOceania,
    ];

    /// The label used in the raw data.
    pub fn label(&self) -> &'static str {
        match self {
            Region::Africa => "Africa",
            Region::EastAsia => "East Asia",
            Region::Europe => "Europe",
            Region::LatinAmerica => "Latin America",
            Region::MiddleEast => "Middle East",
            Region::NorthAmerica => "North America",
            Region::SouthAndWestAsia => "South and West Asia",
            Region::SoutheastAsiaAndOceania => "Southeast Asia and Oceania",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Region {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Region::ALL
            .into_iter()
            .find(|region| region.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::UnknownRegion(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegionFilter {
    #[default]
    All,
    Only(Region),
}

impl RegionFilter {
    /// Whether a record with the resolved `region` passes the filter.
    pub fn matches(&self, region: Option<&str>) -> bool {
        match self {
            RegionFilter::All => true,
            RegionFilter::Only(wanted) => region == Some(wanted.label()),
        }
    }
}

impl fmt::Display for RegionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionFilter::All => f.write_str("All regions"),
            RegionFilter::Only(region) => f.write_str(region.label()),
        }
    }
}

impl FromStr for RegionFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all regions") || trimmed.eq_ignore_ascii_case("all") {
            return Ok(RegionFilter::All);
        }
        trimmed.parse().map(RegionFilter::Only)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum EmissionsChange {
    Increased,
    Decreased,
    Other(String),
}

impl EmissionsChange {
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim() {
            "Increased" => EmissionsChange::Increased,
            "Decreased" => EmissionsChange::Decreased,
            other => EmissionsChange::Other(other.to_string()),
        }
    }
}

/// One city's disclosure for one year, in canonical form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisclosureRecord {
    pub country: Option<String>,
    pub region: Option<String>,
    pub change: Option<EmissionsChange>,
    pub reason: Option<String>,
}

/// Country → region map used to fill in missing regions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionMap {
    regions: HashMap<String, String>,
}

impl RegionMap {
    /// Reads `country` and the first present region column of a snapshot.
    /// Rows with a blank country or region are skipped; a repeated country
    /// takes its last value.
    pub fn from_csv(dataset: &str, csv_text: &str, region_columns: &[&str]) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .from_reader(csv_text.as_bytes());
        let headers = reader.headers()?.clone();
        let country = require_column(&headers, dataset, &[COUNTRY], COUNTRY)?;
        let region = require_column(&headers, dataset, region_columns, REGION)?;

        let mut regions = HashMap::new();
        for row in reader.records() {
            let row = row?;
            if let (Some(country), Some(region)) = (cell(&row, country), cell(&row, region)) {
                regions.insert(country, region);
            }
        }
        Ok(RegionMap { regions })
    }

    /// Fetches and merges [`REGION_LOOKUPS`] in order.
    pub fn load(source: &dyn DataSource) -> Result<Self> {
        let mut merged = RegionMap::default();
        for lookup in &REGION_LOOKUPS {
            let csv_text = source.fetch_csv(lookup.dataset)?;
            merged.merge(RegionMap::from_csv(lookup.dataset, &csv_text, lookup.region)?);
        }
        debug!("Region lookup holds {} countries", merged.len());
        Ok(merged)
    }

    /// Adds `other`; its entries win on collision.
    pub fn merge(&mut self, other: RegionMap) {
        self.regions.extend(other.regions);
    }

    pub fn resolve(&self, country: &str) -> Option<&str> {
        self.regions.get(country).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// Records kept for a request plus their normalized reasons, index-aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub year: u16,
    pub records: Vec<DisclosureRecord>,
    pub fragments: Vec<String>,
}

impl Dataset {
    pub fn has_change_category(&self) -> bool {
        YearSchema::for_year(self.year).is_ok_and(|schema| schema.has_change_category())
    }

    /// Lower-cased reasons of the records whose category is `change`.
    pub fn reasons_with(&self, change: &EmissionsChange) -> Vec<String> {
        self.records
            .iter()
            .filter(|record| record.change.as_ref() == Some(change))
            .filter_map(|record| record.reason.as_deref())
            .map(str::to_lowercase)
            .collect()
    }
}

/// Renames a snapshot's columns to the canonical schema and reads its rows.
pub fn read_records(schema: &YearSchema, csv_text: &str) -> Result<Vec<DisclosureRecord>> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_reader(csv_text.as_bytes());
    let headers = reader.headers()?.clone();
    let dataset = schema.dataset;

    let country = require_column(&headers, dataset, &[COUNTRY], COUNTRY)?;
    let reason = require_column(&headers, dataset, schema.reason, REASON)?;
    let change = schema
        .change
        .map(|names| require_column(&headers, dataset, names, CHANGE))
        .transpose()?;
    let region = schema
        .region
        .map(|names| require_column(&headers, dataset, names, REGION))
        .transpose()?;

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        records.push(DisclosureRecord {
            country: cell(&row, country),
            region: region.and_then(|i| cell(&row, i)),
            change: change
                .and_then(|i| cell(&row, i))
                .map(|raw| EmissionsChange::from_raw(&raw)),
            reason: cell(&row, reason),
        });
    }
    Ok(records)
}

/// Fills missing regions from `map`. Present regions are never replaced.
/// Returns how many records were filled.
pub fn backfill_regions(records: &mut [DisclosureRecord], map: &RegionMap) -> usize {
    let mut filled = 0;
    for record in records.iter_mut().filter(|r| r.region.is_none()) {
        if let Some(region) = record.country.as_deref().and_then(|c| map.resolve(c)) {
            record.region = Some(region.to_string());
            filled += 1;
        }
    }
    filled
}

/// Loads `year`, keeps the records of `region` that carry every field the
/// year needs, and normalizes their lower-cased reasons.
pub fn load(
    source: &dyn DataSource,
    config: &PipelineConfig,
    year: u16,
    region: RegionFilter,
) -> Result<Dataset> {
    let schema = YearSchema::for_year(year)?;
    let csv_text = source.fetch_csv(schema.dataset)?;
    let mut records = read_records(schema, &csv_text)?;
    let rows_read = records.len();

    let filled = if schema.region.is_none() {
        let map = RegionMap::load(source)?;
        backfill_regions(&mut records, &map)
    } else {
        0
    };

    records.retain(|record| region.matches(record.region.as_deref()));
    let in_region = records.len();
    records.retain(|record| {
        record.reason.is_some() && (!schema.has_change_category() || record.change.is_some())
    });

    let normalizer = Normalizer::new(
        config.reason_collection_words.iter().cloned(),
        NormalizeOptions::FULL,
    );
    let lowered: Vec<String> = records
        .iter()
        .filter_map(|record| record.reason.as_deref())
        .map(str::to_lowercase)
        .collect();
    let fragments = normalizer.process_all(&lowered);

    info!(
        "Loaded {} ({}) for {} - rows={}, backfilled={}, in_region={}, kept={}",
        year,
        schema.dataset,
        region,
        rows_read,
        filled,
        in_region,
        records.len()
    );

    Ok(Dataset {
        year,
        records,
        fragments,
    })
}

fn require_column(
    headers: &StringRecord,
    dataset: &str,
    candidates: &[&str],
    canonical: &str,
) -> Result<usize> {
    find_column(headers, candidates).ok_or_else(|| Error::schema_drift(dataset, canonical))
}

fn find_column(headers: &StringRecord, candidates: &[&str]) -> Option<usize> {
    candidates
        .iter()
        .find_map(|name| headers.iter().position(|header| header.trim() == *name))
}

/// A trimmed, non-blank cell.
fn cell(row: &StringRecord, index: usize) -> Option<String> {
    row.get(index)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MemorySource(HashMap<&'static str, &'static str>);

    impl DataSource for MemorySource {
        fn fetch_csv(&self, dataset: &str) -> Result<String> {
            self.0.get(dataset).map(|s| s.to_string()).ok_or_else(|| {
                Error::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    dataset.to_string(),
                ))
            })
        }
    }

    const LOOKUP_2020: &str = "country,cdp_region,change_in_emissions,primary_reason_for_the_change\n\
        Kenya,Africa,Increased,more cars\n\
        Chile,Latin America,Decreased,solar parks\n\
        Georgia,Europe,Decreased,bus lanes\n";
    const LOOKUP_2017: &str = "country,region,increase_decrease_from_last_year,reason_for_increase_decrease_in_emissions\n\
        Chile,Latin America,Increased,growth\n\
        Georgia,South and West Asia,Increased,growth\n\
        Japan,East Asia,Decreased,efficiency\n";

    fn source_with(year_dataset: &'static str, csv: &'static str) -> MemorySource {
        let mut files = HashMap::new();
        files.insert("p43t-fbkj", LOOKUP_2020);
        files.insert("kyi6-dk5h", LOOKUP_2017);
        files.insert(year_dataset, csv);
        MemorySource(files)
    }

    #[test]
    fn schema_table_covers_every_year() {
        for year in FIRST_YEAR..=LAST_YEAR {
            let schema = YearSchema::for_year(year).unwrap();
            assert_eq!(schema.year, year);
            assert_eq!(schema.has_change_category(), year >= 2015);
        }
        assert!(matches!(
            YearSchema::for_year(2012),
            Err(Error::UnsupportedYear(2012))
        ));
    }

    #[test]
    fn region_filter_parses_labels() {
        assert_eq!("All regions".parse::<RegionFilter>().unwrap(), RegionFilter::All);
        assert_eq!(
            "southeast asia and oceania".parse::<RegionFilter>().unwrap(),
            RegionFilter::Only(Region::SoutheastAsiaAndOceania)
        );
        assert!(matches!(
            "Atlantis".parse::<RegionFilter>(),
            Err(Error::UnknownRegion(_))
        ));
        assert_eq!(RegionFilter::Only(Region::EastAsia).to_string(), "East Asia");
    }

    #[test]
    fn later_lookup_wins_and_2020_only_countries_resolve() {
        let source = source_with("unused", "");
        let map = RegionMap::load(&source).unwrap();
        // only in 2020
        assert_eq!(map.resolve("Kenya"), Some("Africa"));
        // in both, the 2017 table is merged last
        assert_eq!(map.resolve("Georgia"), Some("South and West Asia"));
        // only in 2017
        assert_eq!(map.resolve("Japan"), Some("East Asia"));
        assert_eq!(map.resolve("Atlantis"), None);
    }

    #[test]
    fn backfill_never_overwrites() {
        let mut map = RegionMap::default();
        map.merge(RegionMap::from_csv("x", "country,region\nKenya,Africa\n", &[REGION]).unwrap());
        let mut records = vec![
            DisclosureRecord {
                country: Some("Kenya".into()),
                region: Some("Elsewhere".into()),
                change: None,
                reason: Some("a".into()),
            },
            DisclosureRecord {
                country: Some("Kenya".into()),
                region: None,
                change: None,
                reason: Some("b".into()),
            },
        ];
        assert_eq!(backfill_regions(&mut records, &map), 1);
        assert_eq!(records[0].region.as_deref(), Some("Elsewhere"));
        assert_eq!(records[1].region.as_deref(), Some("Africa"));
    }

    #[test]
    fn load_backfills_filters_and_normalizes() {
        let csv = "city,country,reason_for_change\n\
            Nairobi,Kenya,Emissions increased due to more cars\n\
            Lima,Peru,New landfill\n\
            Tokyo,Japan,\n\
            Tbilisi,Georgia,Buses replaced\n";
        let source = source_with("qznk-mn6r", csv);
        let config = PipelineConfig::default();

        let all = load(&source, &config, 2013, RegionFilter::All).unwrap();
        // Tokyo has no reason; Peru has no region but is kept under "All regions"
        assert_eq!(all.records.len(), 3);
        assert_eq!(all.fragments, vec!["car", "new landfill", "bus replace"]);
        assert_eq!(all.records[1].region, None);

        let africa = load(&source, &config, 2013, RegionFilter::Only(Region::Africa)).unwrap();
        assert_eq!(africa.fragments, vec!["car"]);

        let asia = load(
            &source,
            &config,
            2013,
            RegionFilter::Only(Region::SouthAndWestAsia),
        )
        .unwrap();
        assert_eq!(asia.records[0].country.as_deref(), Some("Georgia"));
    }

    #[test]
    fn load_drops_rows_without_category_when_year_has_one() {
        let csv = "country,cdp_region,change_in_emissions,reason_for_change\n\
            Chile,Latin America,Increased,Population growth\n\
            Chile,Latin America,,Methodology\n\
            Chile,Latin America,Decreased,\n";
        let source = source_with("wii4-buw5", csv);
        let dataset = load(&source, &PipelineConfig::default(), 2018, RegionFilter::All).unwrap();
        assert_eq!(dataset.records.len(), 1);
        assert_eq!(dataset.records[0].change, Some(EmissionsChange::Increased));
        assert_eq!(dataset.fragments, vec!["population growth"]);
    }

    #[test]
    fn native_region_years_never_backfill() {
        let csv = "country,cdp_region,change_in_emissions,reason_for_change\n\
            Kenya,,Increased,More cars\n\
            Chile,Latin America,Decreased,Solar parks\n";
        // no lookup tables: fetching one would fail the load
        let mut files = HashMap::new();
        files.insert("wii4-buw5", csv);
        let source = MemorySource(files);
        let config = PipelineConfig::default();

        let africa = load(&source, &config, 2018, RegionFilter::Only(Region::Africa)).unwrap();
        assert!(africa.records.is_empty());
        assert!(africa.fragments.is_empty());

        let all = load(&source, &config, 2018, RegionFilter::All).unwrap();
        assert_eq!(all.records.len(), 2);
        assert_eq!(all.records[0].country.as_deref(), Some("Kenya"));
        assert_eq!(all.records[0].region, None);
        assert_eq!(all.records[1].region.as_deref(), Some("Latin America"));
    }

    #[test]
    fn missing_renamed_column_is_schema_drift() {
        let csv = "country,cdp_region,change_in_emissions,reason\nChile,Latin America,Increased,x\n";
        let source = source_with("542d-zyj8", csv);
        let err = load(&source, &PipelineConfig::default(), 2019, RegionFilter::All).unwrap_err();
        match err {
            Error::SchemaDrift { dataset, column } => {
                assert_eq!(dataset, "542d-zyj8");
                assert_eq!(column, REASON);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
