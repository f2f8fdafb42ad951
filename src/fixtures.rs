//! Shared in-memory catalogs for unit tests.

use betcode_types::{
    BetType, CombinationRule, NumberCombination, PayoutRate, Region, RegionCode, Station,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

fn region(code: RegionCode) -> Region {
    match code {
        RegionCode::North => Region {
            id: 1,
            name: "Miền Bắc".into(),
            code,
        },
        RegionCode::Central => Region {
            id: 2,
            name: "Miền Trung".into(),
            code,
        },
        RegionCode::South => Region {
            id: 3,
            name: "Miền Nam".into(),
            code,
        },
    }
}

fn station(id: i64, name: &str, code: RegionCode, aliases: &[&str]) -> Station {
    Station {
        id,
        name: name.into(),
        region: region(code),
        aliases: aliases.iter().map(|a| a.to_string()).collect(),
    }
}

pub fn stations() -> Vec<Station> {
    vec![
        station(1, "Miền Bắc", RegionCode::North, &["mb", "hn"]),
        station(10, "Đà Nẵng", RegionCode::Central, &["dng"]),
        station(11, "Khánh Hòa", RegionCode::Central, &["kh"]),
        station(20, "TP. Hồ Chí Minh", RegionCode::South, &["tp", "hcm"]),
        station(21, "Đồng Tháp", RegionCode::South, &["dt"]),
        station(22, "Cà Mau", RegionCode::South, &["cm"]),
        station(23, "Bến Tre", RegionCode::South, &["bt"]),
    ]
}

pub fn stations_by_id(ids: &[i64]) -> Vec<Station> {
    stations()
        .into_iter()
        .filter(|s| ids.contains(&s.id))
        .collect()
}

fn table(entries: &[(&str, i64)]) -> Option<PayoutRate> {
    Some(PayoutRate::Table(
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), Decimal::from(*v)))
            .collect::<BTreeMap<_, _>>(),
    ))
}

pub fn bet_types() -> Vec<BetType> {
    vec![
        BetType {
            id: 1,
            name: "Đầu đuôi".into(),
            aliases: vec!["dd".into()],
            applicable_regions: vec![],
            is_permutation: false,
            payout_rate: Some(PayoutRate::Flat(Decimal::from(75))),
            custom_payout_rate: None,
        },
        BetType {
            id: 2,
            name: "Bao lô".into(),
            aliases: vec!["b".into(), "bl".into()],
            applicable_regions: vec![],
            is_permutation: false,
            payout_rate: table(&[("south", 70), ("central", 72), ("north", 80)]),
            custom_payout_rate: None,
        },
        BetType {
            id: 3,
            name: "Xỉu chủ".into(),
            aliases: vec!["xc".into()],
            applicable_regions: vec![RegionCode::South, RegionCode::Central],
            is_permutation: false,
            payout_rate: table(&[("3", 650)]),
            custom_payout_rate: None,
        },
        BetType {
            id: 4,
            name: "Bao đảo".into(),
            aliases: vec!["bd".into(), "dao".into()],
            applicable_regions: vec![],
            is_permutation: true,
            payout_rate: table(&[("south", 70)]),
            custom_payout_rate: None,
        },
        BetType {
            id: 5,
            name: "Đá".into(),
            aliases: vec!["da".into()],
            applicable_regions: vec![],
            is_permutation: false,
            payout_rate: None,
            custom_payout_rate: None,
        },
    ]
}

fn combination(name: &str, aliases: &[&str], generator: CombinationRule) -> NumberCombination {
    NumberCombination {
        name: name.into(),
        aliases: aliases.iter().map(|a| a.to_string()).collect(),
        generator,
    }
}

pub fn combinations() -> Vec<NumberCombination> {
    vec![
        combination("Tài", &["tai"], CombinationRule::Big),
        combination("Xỉu", &["xiu"], CombinationRule::Small),
        combination("Chẵn", &["chan"], CombinationRule::Even),
        combination("Lẻ", &["le"], CombinationRule::Odd),
        combination("Chẵn chẵn", &["cc"], CombinationRule::EvenEven),
        combination("Kép", &["kep"], CombinationRule::Doubles),
        combination("Đầu 5", &["dau5"], CombinationRule::Head { digit: 5 }),
        combination(
            "Lucky",
            &["may man"],
            CombinationRule::Custom {
                calculation_method: "n % 7 == 0".into(),
            },
        ),
    ]
}
