use network::{Network, RouteID, StopID, StopKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum SearchResult {
    Route(RouteID),
    Stop(StopID),
}

fn contains_ignoring_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Routes whose name, origin, destination or landmarks contain the query, ignoring case. An
/// empty query matches everything.
pub fn filter_routes(network: &Network, query: &str) -> Vec<RouteID> {
    let query = query.trim().to_lowercase();
    network
        .routes
        .values()
        .filter(|r| {
            query.is_empty()
                || contains_ignoring_case(&r.name, &query)
                || contains_ignoring_case(&r.origin, &query)
                || contains_ignoring_case(&r.destination, &query)
                || r.landmarks.iter().any(|l| contains_ignoring_case(l, &query))
        })
        .map(|r| r.id)
        .collect()
}

/// Stops matching the query by name, landmark or kind, optionally only of one kind.
pub fn filter_stops(network: &Network, query: &str, kind: Option<StopKind>) -> Vec<StopID> {
    let query = query.trim().to_lowercase();
    network
        .stops
        .values()
        .filter(|s| kind.map(|k| s.kind == k).unwrap_or(true))
        .filter(|s| {
            query.is_empty()
                || contains_ignoring_case(&s.name, &query)
                || contains_ignoring_case(s.kind.describe(), &query)
                || s.landmarks.iter().any(|l| contains_ignoring_case(l, &query))
        })
        .map(|s| s.id)
        .collect()
}

/// Routes first, then stops
pub fn search(network: &Network, query: &str) -> Vec<SearchResult> {
    if query.trim().is_empty() {
        return Vec::new();
    }
    let mut results: Vec<SearchResult> = filter_routes(network, query)
        .into_iter()
        .map(SearchResult::Route)
        .collect();
    results.extend(
        filter_stops(network, query, None)
            .into_iter()
            .map(SearchResult::Stop),
    );
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes() {
        let network = Network::load_embedded().unwrap();
        assert_eq!(filter_routes(&network, "").len(), network.routes.len());
        let plaza = filter_routes(&network, "PLAZA");
        assert!(plaza
            .iter()
            .any(|r| network.routes[r].name == "Suarez to City Plaza"));
        assert!(filter_routes(&network, "zamboanga").is_empty());
    }

    #[test]
    fn stops() {
        let network = Network::load_embedded().unwrap();
        let terminals = filter_stops(&network, "", Some(StopKind::Terminal));
        assert!(terminals
            .iter()
            .all(|s| network.stops[s].kind == StopKind::Terminal));
        assert!(!terminals.is_empty());
        // Matching the kind's description works too
        assert!(filter_stops(&network, "terminal", None).len() >= terminals.len());
        assert!(filter_stops(&network, "hall", None)
            .iter()
            .any(|s| network.stops[s].name == "Suarez Terminal"));
    }

    #[test]
    fn combined() {
        let network = Network::load_embedded().unwrap();
        assert!(search(&network, "  ").is_empty());
        let results = search(&network, "desmark");
        assert!(matches!(results[0], SearchResult::Route(_)));
        assert!(results.iter().any(|r| matches!(r, SearchResult::Stop(_))));
    }
}
