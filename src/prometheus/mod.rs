mod parsers;
mod upgrades;

pub use self::parsers::{
    decode_labels, extract_label_block, parse_exposition, parse_bytes, parse_line, parse_metric_value,
    parse_prometheus, parse_reader, parse_sample, Line,
};
pub use self::upgrades::{upgrade_histogram, upgrade_summary};
