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
//! Basic example: a box thrown at a wall
//!
//! This example shows how to create a world, attach bodies to entities,
//! listen for collisions and step the simulation.

use glam::DVec2;
use physics2d::{Material, Physics, Pose, Scene};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn main() {
    println!("physics2d - Basic Example");
    println!("=========================\n");

    let mut scene = Scene::new();
    let mut physics = Physics::new();

    // A static wall at the origin
    let wall_entity = scene.spawn(Pose::default());
    let wall = physics
        .create_rectangle_body(
            "wall",
            wall_entity,
            Material::new().with_static(true),
            DVec2::new(20.0, 200.0),
            &scene,
        )
        .expect("wall entity is alive");
    println!("Created static wall {:?}", wall);

    // A dynamic box flying towards it, slightly off center so it spins
    let box_entity = scene.spawn(Pose::at(DVec2::new(100.0, 3.0)));
    let thrown = physics
        .create_rectangle_body(
            "box",
            box_entity,
            Material::new().with_line_friction(0.001),
            DVec2::new(10.0, 10.0),
            &scene,
        )
        .expect("box entity is alive");
    physics
        .body_mut(thrown)
        .expect("box was just created")
        .set_line_velocity(DVec2::new(-60.0, 0.0));

    let contacts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&contacts);
    physics
        .body_mut(thrown)
        .expect("box was just created")
        .add_collision_listener(move |contact, _| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                println!("  first contact: {} hit {}", contact.this_entity, contact.other_entity);
            }
        });

    println!("\nSimulating 2 seconds at 50 Hz...");
    for step in 0..100 {
        let report = physics.tick(&mut scene, 0.02);
        if step % 10 == 0 {
            let pose = scene.pose(box_entity).expect("box entity is alive");
            let body = physics.body(thrown).expect("box is alive");
            println!(
                "  t={:.2}s  pos=({:7.2}, {:6.2})  rot={:6.3}  vel=({:7.2}, {:6.2})  pairs={}",
                step as f64 * 0.02,
                pose.location.x,
                pose.location.y,
                pose.rotation,
                body.line_velocity().x,
                body.line_velocity().y,
                report.pairs_tested,
            );
        }
    }

    println!("\nTotal contact ticks: {}", contacts.load(Ordering::SeqCst));
    println!(
        "Distance from (0, 50) to nearest surface: {:.2}",
        physics.map(&scene, DVec2::new(0.0, 50.0))
    );
}
