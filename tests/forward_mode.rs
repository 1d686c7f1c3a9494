use adops::{derivative, Dual, Dual64, ForwardDiff, Scalar, Value};
use approx::assert_relative_eq;

/// Central finite difference: (f(x+h) - f(x-h)) / 2h
fn finite_diff(f: impl Fn(f64) -> f64, x: f64) -> f64 {
    let h = 1e-7;
    (f(x + h) - f(x - h)) / (2.0 * h)
}

/// Test a dual elemental against finite differences.
fn check_elemental(
    f_dual: impl Fn(Dual64) -> Dual64,
    f_f64: impl Fn(f64) -> f64,
    x: f64,
    tol: f64,
) {
    let d = f_dual(Dual::variable(x));
    let expected_deriv = finite_diff(&f_f64, x);
    assert_relative_eq!(d.re, f_f64(x), max_relative = 1e-12);
    assert_relative_eq!(d.eps, expected_deriv, max_relative = tol);
}

// ── Arithmetic ──

#[test]
fn product_rule() {
    // (3 + ε)(4 + ε) = 12 + 7ε
    let c = Dual::new(3.0, 1.0) * Dual::new(4.0, 1.0);
    assert_relative_eq!(c.re, 12.0);
    assert_relative_eq!(c.eps, 7.0);
}

#[test]
fn quotient_rule() {
    // d/dx (x / (x+1)) at x=2: 1/(x+1)^2 = 1/9
    let x = Dual::variable(2.0);
    let y = x / (x + Dual::constant(1.0));
    assert_relative_eq!(y.re, 2.0 / 3.0, max_relative = 1e-12);
    assert_relative_eq!(y.eps, 1.0 / 9.0, max_relative = 1e-12);
}

#[test]
fn negation_and_assign_ops() {
    let mut x = Dual::variable(3.0);
    x *= Dual::constant(2.0);
    x -= Dual::constant(1.0);
    let y = -x;
    assert_eq!((y.re, y.eps), (-5.0, -2.0));
}

#[test]
fn literals_are_constants() {
    let c = Dual64::from_f64(2.5);
    assert_eq!((c.re, c.eps), (2.5, 0.0));
    assert_eq!(Dual::variable(4.0).value(), 4.0);
}

// ── Elementals ──

#[test]
fn sin() {
    check_elemental(|x| x.sin(), f64::sin, 0.7, 1e-6);
}

#[test]
fn cos() {
    check_elemental(|x| x.cos(), f64::cos, 0.7, 1e-6);
}

#[test]
fn tan() {
    check_elemental(|x| x.tan(), f64::tan, 0.4, 1e-6);
}

#[test]
fn exp() {
    check_elemental(|x| x.exp(), f64::exp, 1.3, 1e-6);
}

#[test]
fn ln() {
    check_elemental(|x| x.ln(), f64::ln, 2.5, 1e-6);
}

#[test]
fn sqrt() {
    check_elemental(|x| x.sqrt(), f64::sqrt, 3.0, 1e-6);
}

#[test]
fn tanh() {
    check_elemental(|x| x.tanh(), f64::tanh, 0.3, 1e-6);
}

#[test]
fn powi() {
    check_elemental(|x| x.powi(4), |x| x.powi(4), 1.5, 1e-6);
    check_elemental(|x| x.powi(-2), |x| x.powi(-2), 1.5, 1e-6);
}

#[test]
fn composition() {
    // d/dx exp(sin(x)·x) = exp(sin(x)·x)·(cos(x)·x + sin(x))
    check_elemental(
        |x| (x.sin() * x).exp(),
        |x| (x.sin() * x).exp(),
        0.9,
        1e-6,
    );
}

// ── Nesting ──

#[test]
fn nested_dual_gives_second_derivative() {
    // x = 2 + ε₁ + ε₂ + 0·ε₁ε₂; x³ carries 3x² in each first-order slot and 6x in the cross term.
    let x: Dual<Dual64> = Dual::new(Dual::variable(2.0), Dual::constant(1.0));
    let y = x.powi(3);
    assert_eq!(y.re.re, 8.0);
    assert_eq!(y.re.eps, 12.0);
    assert_eq!(y.eps.re, 12.0);
    assert_eq!(y.eps.eps, 12.0);
}

#[test]
fn forward_diff_backend_on_f32() {
    struct Sin;
    impl adops::Function for Sin {
        fn eval<T: Scalar>(&self, xs: &[Value<T>]) -> adops::Result<Value<T>> {
            Ok(Value::Scalar(xs[0].as_scalar()?.sin()))
        }
    }
    let d = derivative(&ForwardDiff, &Sin, &[Value::Scalar(0.5f32)]).unwrap();
    assert_relative_eq!(d[0].as_scalar().unwrap(), 0.5f32.cos(), max_relative = 1e-6);
}

#[test]
fn powi_zero_is_constant_at_the_origin() {
    let y = Dual::variable(0.0).powi(0);
    assert_eq!((y.re, y.eps), (1.0, 0.0));
    let y = Dual::variable(0.0).powi(2);
    assert_eq!((y.re, y.eps), (0.0, 0.0));
}
