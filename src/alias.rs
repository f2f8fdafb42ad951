//! Bet-type alias index
//!
//! Locates the bet-type alias and trailing stake amount in a bet line.
//! Built once per bet-type catalog and reused across parses.
//!
//! Matching is longest-alias-first: aliases are tried by descending folded
//! length, ties in catalog order, so `bl` wins over `b` regardless of how
//! the catalog is ordered. An occurrence only counts when the alias is
//! immediately followed by the stake amount (`10`, `2.5`) and nothing but
//! whitespace after it.

use betcode_types::BetType;
use nom::{
    character::complete::{char, digit1},
    combinator::{opt, recognize},
    error::ParseError as NomParseError,
    sequence::pair,
    IResult,
};

use crate::normalize::{fold_key, FoldedText};

/// Every bet type sharing one folded alias
#[derive(Debug, Clone)]
struct AliasGroup {
    folded: String,
    /// Alias as written in the first catalog entry that declares it
    display: String,
    /// Indices into the bet-type catalog, in catalog order
    bet_types: Vec<usize>,
}

/// Precompiled alias lookup over a bet-type catalog
#[derive(Debug, Clone, Default)]
pub struct AliasIndex {
    groups: Vec<AliasGroup>,
}

/// Alias located in a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasHit<'a> {
    /// Alias as declared in the catalog
    pub alias: &'a str,
    /// Candidate bet types (catalog indices), in catalog order
    pub bet_types: &'a [usize],
    /// Original text before the alias
    pub numbers_segment: String,
    /// Stake amount text following the alias
    pub amount: String,
}

impl AliasIndex {
    pub fn new(bet_types: &[BetType]) -> Self {
        let mut groups: Vec<AliasGroup> = Vec::new();

        for (idx, bet_type) in bet_types.iter().enumerate() {
            for alias in &bet_type.aliases {
                let folded = fold_key(alias);
                if folded.is_empty() {
                    continue;
                }
                match groups.iter_mut().find(|g| g.folded == folded) {
                    Some(group) => {
                        if !group.bet_types.contains(&idx) {
                            group.bet_types.push(idx);
                        }
                    }
                    None => groups.push(AliasGroup {
                        folded,
                        display: alias.trim().to_string(),
                        bet_types: vec![idx],
                    }),
                }
            }
        }

        // Stable sort keeps catalog order among equal lengths
        groups.sort_by(|a, b| b.folded.len().cmp(&a.folded.len()));

        Self { groups }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Aliases in match order
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.display.as_str())
    }

    /// Find the alias + stake amount in a line.
    pub fn find(&self, line: &str) -> Option<AliasHit<'_>> {
        let line = line.trim();
        let folded = FoldedText::new(line);
        let haystack = folded.as_str();

        for group in &self.groups {
            for (pos, _) in haystack.match_indices(group.folded.as_str()) {
                let after = &haystack[pos + group.folded.len()..];
                let Ok((rest, amount)) = stake_amount::<nom::error::Error<&str>>(after) else {
                    continue;
                };
                if !rest.trim().is_empty() {
                    continue;
                }
                return Some(AliasHit {
                    alias: &group.display,
                    bet_types: &group.bet_types,
                    numbers_segment: line[..folded.original_offset(pos)].to_string(),
                    amount: amount.to_string(),
                });
            }
        }

        None
    }
}

/// Digits with at most one decimal part: `10`, `2.5`
fn stake_amount<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, &'a str, E> {
    recognize(pair(digit1, opt(pair(char('.'), digit1))))(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_basic_hit() {
        let index = AliasIndex::new(&fixtures::bet_types());
        let hit = index.find("23.45.67dd10").unwrap();
        assert_eq!(hit.alias, "dd");
        assert_eq!(hit.bet_types, &[0]);
        assert_eq!(hit.numbers_segment, "23.45.67");
        assert_eq!(hit.amount, "10");
    }

    #[test]
    fn test_longest_alias_wins() {
        let index = AliasIndex::new(&fixtures::bet_types());
        // "b" is declared before "bl" in the catalog
        let hit = index.find("12.34bl5").unwrap();
        assert_eq!(hit.alias, "bl");
        assert_eq!(hit.numbers_segment, "12.34");

        let hit = index.find("12.34b5").unwrap();
        assert_eq!(hit.alias, "b");
    }

    #[test]
    fn test_decimal_amount_and_case() {
        let index = AliasIndex::new(&fixtures::bet_types());
        let hit = index.find("  12 34 DD2.5  ").unwrap();
        assert_eq!(hit.alias, "dd");
        assert_eq!(hit.amount, "2.5");
        assert_eq!(hit.numbers_segment, "12 34 ");
    }

    #[test]
    fn test_alias_inside_numbers_segment_skipped() {
        let index = AliasIndex::new(&fixtures::bet_types());
        // "da" occurs in "dau5" but is not followed by digits there
        let hit = index.find("Đầu5 da2").unwrap();
        assert_eq!(hit.alias, "da");
        assert_eq!(hit.numbers_segment, "Đầu5 ");
    }

    #[test]
    fn test_no_hit() {
        let index = AliasIndex::new(&fixtures::bet_types());
        assert!(index.find("23.45.67").is_none());
        assert!(index.find("23.45zz10").is_none());
        assert!(index.find("23.45dd10 extra").is_none());
        assert!(index.find("23.45dd").is_none());
    }

    #[test]
    fn test_shared_alias_groups_bet_types() {
        let mut bet_types = fixtures::bet_types();
        let mut north_dd = bet_types[0].clone();
        north_dd.id = 99;
        bet_types.push(north_dd);

        let index = AliasIndex::new(&bet_types);
        let hit = index.find("12dd1").unwrap();
        assert_eq!(hit.bet_types, &[0, bet_types.len() - 1]);
        assert_eq!(index.aliases().next(), Some("dao"));
    }
}
