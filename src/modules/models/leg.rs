use std::collections::HashMap;

use diesel::pg::PgConnection;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::legs;

#[derive(Insertable, Serialize, Debug, Clone, Deserialize, Default)]
#[diesel(table_name = legs)]
pub struct NewLeg {
    pub leg_number: i32,
    pub distance: f64,
    pub start_point: Option<String>,
    pub end_point: Option<String>,
    pub elevation: Option<f64>,
    pub difficulty: Option<String>,
    pub start_lat: Option<f64>,
    pub start_lng: Option<f64>,
    pub end_lat: Option<f64>,
    pub end_lng: Option<f64>,
}

impl NewLeg {
    /// # difficulty from distance
    /// legs over 6 miles are hard, under 4 miles easy
    pub fn difficulty_for(distance: f64) -> &'static str {
        if distance > 6.0 {
            "hard"
        } else if distance < 4.0 {
            "easy"
        } else {
            "moderate"
        }
    }
}

/// # leg
/// one segment of the course. only `leg_number` and `distance` take part in
/// any computation, the rest is passed through to the map view.
#[derive(Queryable, Identifiable, Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct Leg {
    pub id: i32,
    pub leg_number: i32,
    pub distance: f64,
    pub start_point: Option<String>,
    pub end_point: Option<String>,
    pub elevation: Option<f64>,
    pub difficulty: Option<String>,
    pub start_lat: Option<f64>,
    pub start_lng: Option<f64>,
    pub end_lat: Option<f64>,
    pub end_lng: Option<f64>,
}

impl Leg {
    /// # a leg with only the fields the standings need
    pub fn bare(id: i32, leg_number: i32, distance: f64) -> Leg {
        Leg {
            id,
            leg_number,
            distance,
            start_point: None,
            end_point: None,
            elevation: None,
            difficulty: None,
            start_lat: None,
            start_lng: None,
            end_lat: None,
            end_lng: None,
        }
    }

    pub fn new(conn: &mut PgConnection, new_leg: &NewLeg) -> QueryResult<Leg> {
        diesel::insert_into(legs::table)
            .values(new_leg)
            .get_result::<Leg>(conn)
    }

    pub fn get_all(conn: &mut PgConnection) -> QueryResult<Vec<Leg>> {
        use crate::schema::legs::dsl::*;

        legs.order(leg_number.asc()).load::<Leg>(conn)
    }

    pub fn get_by_number(conn: &mut PgConnection, number_in: i32) -> QueryResult<Leg> {
        use crate::schema::legs::dsl::*;

        legs.filter(leg_number.eq(number_in)).first::<Leg>(conn)
    }

    /// # distances by leg number
    ///
    /// ## Arguments
    /// * `legs` - the legs to index
    ///
    /// ## Returns
    /// * `HashMap<i32, f64>` - leg number to distance in miles
    pub fn distance_map(legs: &[Leg]) -> HashMap<i32, f64> {
        legs.iter().map(|leg| (leg.leg_number, leg.distance)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_follows_distance() {
        assert_eq!(NewLeg::difficulty_for(6.13), "hard");
        assert_eq!(NewLeg::difficulty_for(3.71), "easy");
        assert_eq!(NewLeg::difficulty_for(6.0), "moderate");
        assert_eq!(NewLeg::difficulty_for(4.0), "moderate");
    }

    #[test]
    fn distance_map_is_keyed_by_leg_number() {
        let legs = vec![Leg::bare(10, 1, 5.22), Leg::bare(11, 2, 5.34)];
        let map = Leg::distance_map(&legs);
        assert_eq!(map.get(&2), Some(&5.34));
        assert_eq!(map.get(&3), None);
    }
}
