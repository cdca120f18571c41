// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Ray sensor example: a turret scanning a room
//!
//! A sensor attached to a rotating entity reports the closest body along
//! its facing each tick. One crate is ignored so the ray sees past it.

use glam::DVec2;
use physics2d::{Material, Physics, Pose, Scene};
use std::f64::consts::TAU;

fn main() {
    println!("physics2d - Ray Sensor Example");
    println!("==============================\n");

    let mut scene = Scene::new();
    let mut physics = Physics::new();
    let solid = Material::new().with_static(true);

    let mut targets = Vec::new();
    for (name, location, size) in [
        ("east wall", DVec2::new(80.0, 0.0), DVec2::new(10.0, 160.0)),
        ("north wall", DVec2::new(0.0, 80.0), DVec2::new(160.0, 10.0)),
        ("crate", DVec2::new(30.0, 0.0), DVec2::new(8.0, 8.0)),
        ("pillar", DVec2::new(-40.0, -40.0), DVec2::new(12.0, 12.0)),
    ] {
        let entity = scene.spawn(Pose::at(location));
        let body = physics
            .create_rectangle_body(name, entity, solid, size, &scene)
            .expect("target entity is alive");
        targets.push(body);
    }

    let turret = scene.spawn(Pose::default());
    let sensor = physics
        .create_ray_sensor("turret", turret, &scene)
        .expect("turret entity is alive");
    physics
        .ray_sensor_mut(sensor)
        .expect("sensor was just created")
        .add_to_ignore(targets[2]);

    let steps = 16;
    for step in 0..steps {
        let angle = TAU * step as f64 / steps as f64;
        scene.set_pose(turret, Pose::new(DVec2::ZERO, angle));
        physics.tick(&mut scene, 0.02);

        let ray = physics.ray_sensor(sensor).expect("sensor is alive");
        match ray.observable().and_then(|handle| physics.body(handle)) {
            Some(body) => println!(
                "  {:6.1} deg: {:<10} at {:6.2}",
                angle.to_degrees(),
                body.name(),
                ray.distance()
            ),
            None => println!("  {:6.1} deg: nothing", angle.to_degrees()),
        }
    }
}
