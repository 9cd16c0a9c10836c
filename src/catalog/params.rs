use std::str::FromStr;

use crate::util::QueryParams;

/// Category that, together with `kind=tv`, selects the short-video upstream.
pub const SHORT_VIDEO_CATEGORY: &str = "duanju";

const DEFAULT_KIND: &str = "movie";
const DEFAULT_LIMIT: &str = "20";
const DEFAULT_START: &str = "0";
const MAX_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Movie,
    Tv,
}

impl FromStr for CatalogKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(CatalogKind::Movie),
            "tv" => Ok(CatalogKind::Tv),
            _ => Err(ValidationError::InvalidKind),
        }
    }
}

impl CatalogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogKind::Movie => "movie",
            CatalogKind::Tv => "tv",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneralQuery {
    pub kind: CatalogKind,
    pub category: String,
    pub item_type: String,
    pub start: u64,
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortVideoQuery {
    pub page: u64,
    pub page_size: u32,
}

/// The upstream a request is dispatched to, with everything it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogRoute {
    General(GeneralQuery),
    ShortVideo(ShortVideoQuery),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required parameter: kind, category or type")]
    MissingParams,
    #[error("limit must be an integer between 1 and 100")]
    InvalidLimit,
    #[error("start must be an integer not less than 0")]
    InvalidStart,
    #[error("kind must be tv or movie")]
    InvalidKind,
}

/// Validate the raw query and pick the upstream. Checks run in a fixed order
/// and stop at the first failure.
pub fn parse_route(params: &QueryParams) -> Result<CatalogRoute, ValidationError> {
    let kind = params.get_or("kind", DEFAULT_KIND);
    let category = params.get("category").ok_or(ValidationError::MissingParams)?;

    let short_video = kind == "tv" && category == SHORT_VIDEO_CATEGORY;
    let item_type = params.get("type");
    if item_type.is_none() && !short_video {
        return Err(ValidationError::MissingParams);
    }

    let limit = params
        .get_or("limit", DEFAULT_LIMIT)
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|l| (1..=MAX_LIMIT).contains(l))
        .ok_or(ValidationError::InvalidLimit)?;

    let start = params
        .get_or("start", DEFAULT_START)
        .trim()
        .parse::<u64>()
        .map_err(|_| ValidationError::InvalidStart)?;

    if short_video {
        return Ok(CatalogRoute::ShortVideo(ShortVideoQuery {
            page: start / u64::from(limit) + 1,
            page_size: limit,
        }));
    }

    let kind = kind.parse::<CatalogKind>()?;

    Ok(CatalogRoute::General(GeneralQuery {
        kind,
        category: category.to_string(),
        item_type: item_type.unwrap_or_default().to_string(),
        start,
        limit,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_general_defaults() {
        let route = parse_route(&params(&[("category", "热门"), ("type", "全部")])).unwrap();
        assert_eq!(
            route,
            CatalogRoute::General(GeneralQuery {
                kind: CatalogKind::Movie,
                category: "热门".to_string(),
                item_type: "全部".to_string(),
                start: 0,
                limit: 20,
            })
        );
    }

    #[test]
    fn test_empty_kind_defaults_to_movie() {
        let route =
            parse_route(&params(&[("kind", ""), ("category", "hot"), ("type", "all")])).unwrap();
        assert!(matches!(
            route,
            CatalogRoute::General(GeneralQuery { kind: CatalogKind::Movie, .. })
        ));
    }

    #[test]
    fn test_missing_category_or_type() {
        assert_eq!(
            parse_route(&params(&[("type", "all")])),
            Err(ValidationError::MissingParams)
        );
        assert_eq!(
            parse_route(&params(&[("category", "hot")])),
            Err(ValidationError::MissingParams)
        );
        assert_eq!(
            parse_route(&params(&[("kind", "tv"), ("category", "hot")])),
            Err(ValidationError::MissingParams)
        );
    }

    #[test]
    fn test_limit_bounds() {
        for limit in ["0", "101", "-5", "abc", "2.5"] {
            assert_eq!(
                parse_route(&params(&[("category", "hot"), ("type", "all"), ("limit", limit)])),
                Err(ValidationError::InvalidLimit),
                "limit={limit}"
            );
        }
        for limit in ["1", "100"] {
            assert!(
                parse_route(&params(&[("category", "hot"), ("type", "all"), ("limit", limit)]))
                    .is_ok()
            );
        }
    }

    #[test]
    fn test_negative_start() {
        assert_eq!(
            parse_route(&params(&[("category", "hot"), ("type", "all"), ("start", "-1")])),
            Err(ValidationError::InvalidStart)
        );
    }

    #[test]
    fn test_invalid_kind() {
        assert_eq!(
            parse_route(&params(&[("kind", "music"), ("category", "hot"), ("type", "all")])),
            Err(ValidationError::InvalidKind)
        );
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("movie".parse::<CatalogKind>(), Ok(CatalogKind::Movie));
        assert_eq!("tv".parse::<CatalogKind>(), Ok(CatalogKind::Tv));
        assert_eq!("TV".parse::<CatalogKind>(), Err(ValidationError::InvalidKind));
        assert_eq!(CatalogKind::Tv.as_str(), "tv");
    }

    #[test]
    fn test_limit_checked_before_kind() {
        assert_eq!(
            parse_route(&params(&[
                ("kind", "music"),
                ("category", "hot"),
                ("type", "all"),
                ("limit", "0"),
            ])),
            Err(ValidationError::InvalidLimit)
        );
    }

    #[test]
    fn test_short_video_page() {
        let route = parse_route(&params(&[
            ("kind", "tv"),
            ("category", "duanju"),
            ("start", "40"),
            ("limit", "20"),
        ]))
        .unwrap();
        assert_eq!(
            route,
            CatalogRoute::ShortVideo(ShortVideoQuery { page: 3, page_size: 20 })
        );
    }

    #[test]
    fn test_short_video_page_rounds_down() {
        let route = parse_route(&params(&[
            ("kind", "tv"),
            ("category", "duanju"),
            ("start", "30"),
            ("limit", "20"),
        ]))
        .unwrap();
        assert_eq!(
            route,
            CatalogRoute::ShortVideo(ShortVideoQuery { page: 2, page_size: 20 })
        );
    }

    #[test]
    fn test_duanju_as_movie_is_general() {
        let route = parse_route(&params(&[
            ("kind", "movie"),
            ("category", "duanju"),
            ("type", "all"),
        ]))
        .unwrap();
        assert!(matches!(route, CatalogRoute::General(_)));
    }
}
