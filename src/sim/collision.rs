//! Collision detection
//!
//! Everything on the road is an axis-aligned rect, but collisions use a
//! hitbox smaller than the art (half the width, 40% of the height, centered)
//! so grazing a bumper's artwork never ends a run.

use super::state::{Body, Car, Obstacle};

/// Do two bodies collide? Hitboxes only; draw bounds never collide.
pub fn bodies_collide(a: &Body, b: &Body) -> bool {
    a.hitbox().intersects(&b.hitbox())
}

/// Has the player's car hit this obstacle?
pub fn car_hits_obstacle(car: &Car, obstacle: &Obstacle) -> bool {
    bodies_collide(&car.body, &obstacle.body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::SpriteId;
    use crate::sim::{Rect, Road};
    use proptest::prelude::*;

    #[test]
    fn test_cars_stacked_on_same_spot_collide() {
        let car = Car::spawn(800.0, 600.0);
        let center = car.body.bounds.center();
        // Obstacle centered on the car's center
        let size = SpriteId::Cruiser.size() * crate::consts::OBSTACLE_SCALE;
        let obstacle_body = Body::new(
            SpriteId::Cruiser,
            crate::consts::OBSTACLE_SCALE,
            center.x - size.x / 2.0,
            center.y - size.y / 2.0,
        );
        let obstacle = Obstacle {
            body: obstacle_body,
            vertical_speed: 250.0,
            lane: 1,
        };
        assert!(car_hits_obstacle(&car, &obstacle));
    }

    #[test]
    fn test_draw_overlap_alone_is_a_near_miss() {
        let car = Car::spawn(800.0, 600.0);
        let draw = car.body.draw_bounds();
        let hit = car.body.hitbox();

        // Obstacle whose draw bounds clip the car's left art margin but whose
        // hitbox stops short of the car's hitbox.
        let size = SpriteId::Cruiser.size() * crate::consts::OBSTACLE_SCALE;
        let x = draw.x - size.x + (hit.x - draw.x) / 2.0;
        let obstacle = Obstacle {
            body: Body::new(SpriteId::Cruiser, crate::consts::OBSTACLE_SCALE, x, draw.y),
            vertical_speed: 250.0,
            lane: 0,
        };

        assert!(obstacle.body.draw_bounds().intersects(&draw));
        assert!(!car_hits_obstacle(&car, &obstacle));
    }

    #[test]
    fn test_vertical_gap_between_hitboxes_is_a_miss() {
        let car = Car::spawn(800.0, 600.0);
        let draw = car.body.draw_bounds();
        let hit = car.body.hitbox();

        // Obstacle directly above: art rectangles overlap vertically, the
        // shrunken hitboxes do not.
        let size = SpriteId::Cruiser.size() * crate::consts::OBSTACLE_SCALE;
        let y = draw.y - size.y + (hit.y - draw.y) / 2.0;
        let obstacle = Obstacle {
            body: Body::new(SpriteId::Cruiser, crate::consts::OBSTACLE_SCALE, draw.x, y),
            vertical_speed: 250.0,
            lane: 1,
        };

        assert!(obstacle.body.draw_bounds().intersects(&draw));
        assert!(!car_hits_obstacle(&car, &obstacle));
    }

    #[test]
    fn test_obstacle_in_adjacent_lane_misses() {
        let road = Road::new(800.0);
        let mut car = Car::spawn(800.0, 600.0);
        // Pin the car to the left lane, obstacle in the right lane
        car.body.bounds.x = road.start_x;
        let mut obstacle = Obstacle::spawn(&road, 2);
        obstacle.body.bounds.y = car.body.bounds.y;
        assert!(!car_hits_obstacle(&car, &obstacle));
    }

    proptest! {
        /// For any positive scale and position, the hitbox sits strictly
        /// inside the draw bounds on all four sides.
        #[test]
        fn test_hitbox_strictly_inside_draw_bounds(
            scale in 0.01f32..8.0,
            x in -500.0f32..500.0,
            y in -500.0f32..500.0,
        ) {
            let body = Body::new(SpriteId::Cruiser, scale, x, y);
            let draw = body.draw_bounds();
            let hit = body.hitbox();
            prop_assert!(hit.x > draw.x);
            prop_assert!(hit.y > draw.y);
            prop_assert!(hit.right() < draw.right());
            prop_assert!(hit.bottom() < draw.bottom());
            prop_assert!((hit.center() - draw.center()).length() < 1e-2);
        }

        /// Strict-inequality overlap: separated rects never collide, no
        /// matter how close.
        #[test]
        fn test_separated_rects_never_collide(gap in 0.001f32..100.0) {
            let a = Rect::new(0.0, 0.0, 50.0, 50.0);
            let b = Rect::new(50.0 + gap, 0.0, 50.0, 50.0);
            prop_assert!(!a.intersects(&b));
        }
    }
}
