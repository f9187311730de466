use std::fmt;

/// Матрица цветового преобразования 3x3, построчно
pub type Mat3 = [f32; 9];

pub const IDENTITY: Mat3 = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

/// Матрица насыщенности в духе libvibrant: `(1 - s) / 3` везде плюс `s` на диагонали.
/// `s = 0` даёт полное обесцвечивание, `s = 1` эквивалентна единичной.
pub fn saturation_matrix(saturation: f32) -> Mat3 {
    let coeff = (1.0 - saturation) / 3.0;
    let mut mat = [0.0; 9];
    for (i, value) in mat.iter_mut().enumerate() {
        *value = coeff + if i % 4 == 0 { saturation } else { 0.0 };
    }
    mat
}

/// Что должно быть на мониторе: нетронутое состояние или заданная насыщенность
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ctm {
    Identity,
    Saturation(f32),
}

impl Ctm {
    /// Нулевая насыщенность означает "не трогать"
    pub fn for_saturation(saturation: f32) -> Self {
        if saturation != 0.0 {
            Self::Saturation(saturation)
        } else {
            Self::Identity
        }
    }

    pub fn matrix(&self) -> Mat3 {
        match self {
            Self::Identity => IDENTITY,
            Self::Saturation(s) => saturation_matrix(*s),
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, Self::Identity)
    }
}

impl fmt::Display for Ctm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => write!(f, "identity"),
            Self::Saturation(s) => write!(f, "saturation {}", s),
        }
    }
}

/// Матрица в виде `a,b,c,...` для внешней команды
pub fn format_matrix(matrix: &Mat3) -> String {
    matrix
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < EPS, "{} != {}", a, b);
    }

    #[test]
    fn test_diagonal_and_off_diagonal() {
        for s in [0.0_f32, 0.25, 0.5, 0.8, 1.0] {
            let m = saturation_matrix(s);
            let coeff = (1.0 - s) / 3.0;
            for (i, v) in m.iter().enumerate() {
                if i % 4 == 0 {
                    assert_close(*v, coeff + s);
                } else {
                    assert_close(*v, coeff);
                }
            }
        }
    }

    #[test]
    fn test_zero_saturation_is_luma_average() {
        for v in saturation_matrix(0.0) {
            assert_close(v, 1.0 / 3.0);
        }
    }

    #[test]
    fn test_full_saturation_matches_identity() {
        for (a, b) in saturation_matrix(1.0).iter().zip(IDENTITY.iter()) {
            assert_close(*a, *b);
        }
    }

    #[test]
    fn test_out_of_range_is_not_clamped() {
        let m = saturation_matrix(1.6);
        assert_close(m[0], -0.2 + 1.6);
        assert_close(m[1], -0.2);
    }

    #[test]
    fn test_ctm_for_saturation() {
        assert_eq!(Ctm::for_saturation(0.0), Ctm::Identity);
        assert_eq!(Ctm::for_saturation(0.5), Ctm::Saturation(0.5));
        assert_eq!(Ctm::Identity.matrix(), IDENTITY);
        assert_eq!(format_matrix(&IDENTITY), "1,0,0,0,1,0,0,0,1");
    }
}
