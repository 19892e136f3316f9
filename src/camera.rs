//! A pinhole camera in a z-up world, producing one primary ray per pixel.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

use crate::ray::Ray;
use crate::{Point3, Real, Vector3};

/// Field of view used by [`Camera::look_at`].
pub const DEFAULT_FOV: Real = FRAC_PI_4;

/// Pitch stays this far away from straight up or down.
const PITCH_LIMIT: Real = FRAC_PI_2 - 0.01;

/// A pinhole camera.
///
/// The base orientation is fixed when the camera is created. [`Camera::rotate`] accumulates
/// yaw around the base up vector and pitch around the resulting right vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Eye position.
    pub position: Point3,

    /// Field of view in radians, spanning the shorter image side.
    pub fov: Real,

    forward: Vector3,
    right: Vector3,
    up: Vector3,
    yaw: Real,
    pitch: Real,
}

impl Camera {
    /// Creates a camera at `position` looking at `target`, with `+z` as world up.
    ///
    /// When `target` coincides with `position` the camera looks along `+y`. When it lies
    /// straight above or below, `+x` is used as the right vector.
    pub fn look_at(position: Point3, target: Point3) -> Camera {
        let global_up = Vector3::z();
        let forward = (target - position)
            .try_normalize(Real::EPSILON)
            .unwrap_or_else(Vector3::y);
        let right = forward
            .cross(&global_up)
            .try_normalize(Real::EPSILON)
            .unwrap_or_else(Vector3::x);
        let up = right.cross(&forward);

        Camera {
            position,
            fov: DEFAULT_FOV,
            forward,
            right,
            up,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    /// Returns a copy of this camera with the given field of view in radians.
    pub fn with_fov(mut self, fov: Real) -> Camera {
        self.fov = fov;
        self
    }

    /// Returns the orthonormal `(forward, right, up)` basis after yaw and pitch.
    pub fn basis(&self) -> (Vector3, Vector3, Vector3) {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let forward = self.forward * cos_yaw + self.right * sin_yaw;
        let right = self.right * cos_yaw - self.forward * sin_yaw;

        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        let up = self.up * cos_pitch - forward * sin_pitch;
        let forward = forward * cos_pitch + self.up * sin_pitch;

        (forward, right, up)
    }

    /// Viewing direction.
    pub fn forward(&self) -> Vector3 {
        self.basis().0
    }

    /// Unit vector pointing to the right of the image.
    pub fn right(&self) -> Vector3 {
        self.basis().1
    }

    /// Unit vector pointing to the top of the image.
    pub fn up(&self) -> Vector3 {
        self.basis().2
    }

    /// Turns the camera right by `d_yaw` and up by `d_pitch`, both in radians.
    /// Pitch is clamped short of the poles.
    pub fn rotate(&mut self, d_yaw: Real, d_pitch: Real) {
        self.yaw += d_yaw;
        self.pitch = (self.pitch + d_pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Moves the eye by `offset`.
    pub fn move_by(&mut self, offset: Vector3) {
        self.position += offset;
    }

    /// Returns the ray through the center of pixel `(x, y)` of a `width` x `height` image.
    /// Row 0 is the top of the image. The direction is normalized, so hit distances are
    /// metric.
    ///
    /// # Examples
    /// ```
    /// use tribvh::camera::Camera;
    /// use tribvh::Point3;
    ///
    /// let camera = Camera::look_at(Point3::new(0.0, -2.0, 0.0), Point3::origin());
    /// let ray = camera.primary_ray(1, 1, 3, 3);
    /// assert!((ray.direction.y - 1.0).abs() < 1e-6);
    /// ```
    pub fn primary_ray(&self, x: usize, y: usize, width: usize, height: usize) -> Ray {
        let (forward, right, up) = self.basis();
        let tan_half_fov = (self.fov / 2.0).tan();
        let aspect_ratio = width.max(height) as Real / width.min(height).max(1) as Real;

        let pixel_x = (x as Real + 0.5) / width as Real;
        let pixel_y = (y as Real + 0.5) / height as Real;
        let screen_x = (2.0 * pixel_x - 1.0) * aspect_ratio;
        let screen_y = 1.0 - 2.0 * pixel_y;

        let direction =
            (forward + right * (tan_half_fov * screen_x) + up * (tan_half_fov * screen_y)).normalize();
        Ray::new(self.position, direction)
    }
}

impl Default for Camera {
    /// Two units in front of the origin, looking at it along `+y`.
    fn default() -> Camera {
        Camera::look_at(Point3::new(0.0, -2.0, 0.0), Point3::origin())
    }
}
