//! Serde utilities for glam types.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Serde proxy for Vec2
#[derive(Serialize, Deserialize)]
pub struct Vec2Def {
    pub x: f32,
    pub y: f32,
}

impl From<Vec2> for Vec2Def {
    fn from(v: Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl From<Vec2Def> for Vec2 {
    fn from(def: Vec2Def) -> Self {
        Vec2::new(def.x, def.y)
    }
}

pub fn serialize_vec2<S>(v: &Vec2, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    Vec2Def::from(*v).serialize(s)
}

pub fn deserialize_vec2<'de, D>(d: D) -> Result<Vec2, D::Error>
where
    D: Deserializer<'de>,
{
    Vec2Def::deserialize(d).map(Vec2::from)
}

/// Serde proxy for an RGB color stored as Vec3
#[derive(Serialize, Deserialize)]
pub struct RgbDef {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl From<Vec3> for RgbDef {
    fn from(v: Vec3) -> Self {
        Self {
            r: v.x,
            g: v.y,
            b: v.z,
        }
    }
}

impl From<RgbDef> for Vec3 {
    fn from(def: RgbDef) -> Self {
        Vec3::new(def.r, def.g, def.b)
    }
}

pub fn serialize_rgb<S>(v: &Vec3, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    RgbDef::from(*v).serialize(s)
}

pub fn deserialize_rgb<'de, D>(d: D) -> Result<Vec3, D::Error>
where
    D: Deserializer<'de>,
{
    RgbDef::deserialize(d).map(Vec3::from)
}
