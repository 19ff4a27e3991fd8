//! ECS integration scenarios spanning the world, views, systems and the
//! built-in components

mod world_integration;
mod collision_integration;
