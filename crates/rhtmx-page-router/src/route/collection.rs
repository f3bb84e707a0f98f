//! Ordered set of named routes
//!
//! Order is significant: the first matching route wins.
use super::{Route, RouteName};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteCollection {
    routes: Vec<(RouteName, Route)>,
}

impl RouteCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a route, replacing an existing route of the same name in place
    pub fn add(&mut self, name: RouteName, route: Route) {
        match self.routes.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = route,
            None => self.routes.push((name, route)),
        }
    }

    pub fn get(&self, name: &RouteName) -> Option<&Route> {
        self.routes.iter().find(|(n, _)| n == name).map(|(_, route)| route)
    }

    pub fn contains(&self, name: &RouteName) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> Vec<RouteName> {
        self.routes.iter().map(|(name, _)| *name).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RouteName, &Route)> {
        self.routes.iter().map(|(name, route)| (name, route))
    }

    pub fn first(&self) -> Option<(&RouteName, &Route)> {
        self.iter().next()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn into_vec(self) -> Vec<(RouteName, Route)> {
        self.routes
    }
}

impl FromIterator<(RouteName, Route)> for RouteCollection {
    fn from_iter<I: IntoIterator<Item = (RouteName, Route)>>(iter: I) -> Self {
        let mut collection = Self::new();
        iter.into_iter().for_each(|(name, route)| collection.add(name, route));
        collection
    }
}

impl IntoIterator for RouteCollection {
    type Item = (RouteName, Route);
    type IntoIter = std::vec::IntoIter<(RouteName, Route)>;

    fn into_iter(self) -> Self::IntoIter {
        self.routes.into_iter()
    }
}
