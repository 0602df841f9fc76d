use core::ops::Add;
use core::ops::Div;
use core::ops::Index;
use core::ops::Mul;
use core::ops::Sub;

use crate::math::vector::{vec4, Vec4};

/// 4x4 matrix stored as four columns. Vectors multiply on the right as
/// column vectors, so translation lives in the fourth column.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat4 {
    cols: [Vec4; 4],
}

impl Mat4 {
    pub fn from_cols(cols: [Vec4; 4]) -> Self {
        Self { cols }
    }

    pub fn identity() -> Self {
        Self::from_cols([
            vec4(1.0, 0.0, 0.0, 0.0),
            vec4(0.0, 1.0, 0.0, 0.0),
            vec4(0.0, 0.0, 1.0, 0.0),
            vec4(0.0, 0.0, 0.0, 1.0),
        ])
    }

    pub fn scale(v: Vec4) -> Self {
        Self::from_cols([
            vec4(v.x, 0.0, 0.0, 0.0),
            vec4(0.0, v.y, 0.0, 0.0),
            vec4(0.0, 0.0, v.z, 0.0),
            vec4(0.0, 0.0, 0.0, 1.0),
        ])
    }

    pub fn translate(v: Vec4) -> Self {
        Self::from_cols([
            vec4(1.0, 0.0, 0.0, 0.0),
            vec4(0.0, 1.0, 0.0, 0.0),
            vec4(0.0, 0.0, 1.0, 0.0),
            vec4(v.x, v.y, v.z, 1.0),
        ])
    }

    /// Rodrigues rotation around a unit axis, angle in radians:
    /// R = cos(a)*I + sin(a)*[axis]x + (1 - cos(a))*axis(x)axis
    pub fn rotate(axis: Vec4, angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;
        let (x, y, z) = (axis.x, axis.y, axis.z);

        Self::from_cols([
            vec4(c + x * x * t, z * s + y * x * t, -y * s + z * x * t, 0.0),
            vec4(-z * s + x * y * t, c + y * y * t, x * s + z * y * t, 0.0),
            vec4(y * s + x * z * t, -x * s + y * z * t, c + z * z * t, 0.0),
            vec4(0.0, 0.0, 0.0, 1.0),
        ])
    }

    /// The nth row as a vector.
    pub fn row(&self, n: usize) -> Vec4 {
        vec4(
            self.cols[0][n],
            self.cols[1][n],
            self.cols[2][n],
            self.cols[3][n],
        )
    }
}

impl Index<usize> for Mat4 {
    type Output = Vec4;

    fn index(&self, i: usize) -> &Vec4 {
        &self.cols[i]
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;

    fn mul(self, v: Vec4) -> Vec4 {
        vec4(
            self.row(0).dot(v),
            self.row(1).dot(v),
            self.row(2).dot(v),
            self.row(3).dot(v),
        )
    }
}

impl Mul<Mat4> for Mat4 {
    type Output = Mat4;

    fn mul(self, other: Mat4) -> Mat4 {
        let row0 = self.row(0);
        let row1 = self.row(1);
        let row2 = self.row(2);
        let row3 = self.row(3);

        let col = |c: Vec4| vec4(row0.dot(c), row1.dot(c), row2.dot(c), row3.dot(c));

        Mat4::from_cols([
            col(other.cols[0]),
            col(other.cols[1]),
            col(other.cols[2]),
            col(other.cols[3]),
        ])
    }
}

impl Mul<f32> for Mat4 {
    type Output = Mat4;

    fn mul(self, value: f32) -> Mat4 {
        Mat4::from_cols([
            self.cols[0] * value,
            self.cols[1] * value,
            self.cols[2] * value,
            self.cols[3] * value,
        ])
    }
}

impl Div<f32> for Mat4 {
    type Output = Mat4;

    fn div(self, value: f32) -> Mat4 {
        Mat4::from_cols([
            self.cols[0] / value,
            self.cols[1] / value,
            self.cols[2] / value,
            self.cols[3] / value,
        ])
    }
}

impl Add<f32> for Mat4 {
    type Output = Mat4;

    fn add(self, value: f32) -> Mat4 {
        Mat4::from_cols([
            self.cols[0] + value,
            self.cols[1] + value,
            self.cols[2] + value,
            self.cols[3] + value,
        ])
    }
}

impl Sub<f32> for Mat4 {
    type Output = Mat4;

    fn sub(self, value: f32) -> Mat4 {
        Mat4::from_cols([
            self.cols[0] - value,
            self.cols[1] - value,
            self.cols[2] - value,
            self.cols[3] - value,
        ])
    }
}

impl Add<Mat4> for Mat4 {
    type Output = Mat4;

    fn add(self, other: Mat4) -> Mat4 {
        Mat4::from_cols([
            self.cols[0] + other.cols[0],
            self.cols[1] + other.cols[1],
            self.cols[2] + other.cols[2],
            self.cols[3] + other.cols[3],
        ])
    }
}

impl Sub<Mat4> for Mat4 {
    type Output = Mat4;

    fn sub(self, other: Mat4) -> Mat4 {
        Mat4::from_cols([
            self.cols[0] - other.cols[0],
            self.cols[1] - other.cols[1],
            self.cols[2] - other.cols[2],
            self.cols[3] - other.cols[3],
        ])
    }
}
