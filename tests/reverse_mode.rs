use adops::{Reverse, Scalar, Tape};
use approx::assert_relative_eq;

/// Run a single-variable reverse-mode differentiation.
fn reverse_grad(f: impl for<'t> FnOnce(Reverse<'t, f64>) -> Reverse<'t, f64>, x_val: f64) -> f64 {
    let tape = Tape::new();
    let x = Reverse::variable(&tape, x_val);
    let y = f(x);
    let adjoints = tape.reverse(y.index());
    adjoints[x.index() as usize]
}

/// Central finite difference for comparison.
fn finite_diff(f: impl Fn(f64) -> f64, x: f64) -> f64 {
    let h = 1e-7;
    (f(x + h) - f(x - h)) / (2.0 * h)
}

fn check_reverse_elemental(
    f_rev: impl for<'t> FnOnce(Reverse<'t, f64>) -> Reverse<'t, f64>,
    f_f64: impl Fn(f64) -> f64,
    x: f64,
    tol: f64,
) {
    let grad = reverse_grad(f_rev, x);
    let expected = finite_diff(&f_f64, x);
    assert_relative_eq!(grad, expected, max_relative = tol);
}

// ── Arithmetic ──

#[test]
fn x_squared() {
    let grad = reverse_grad(|x| x * x, 3.0);
    assert_relative_eq!(grad, 6.0, max_relative = 1e-12);
}

#[test]
fn x_times_y() {
    let tape = Tape::new();
    let x = Reverse::variable(&tape, 3.0);
    let y = Reverse::variable(&tape, 4.0);
    let z = x * y;
    assert_eq!(z.primal(), 12.0);
    let adjoints = tape.reverse(z.index());
    assert_eq!(adjoints[x.index() as usize], 4.0);
    assert_eq!(adjoints[y.index() as usize], 3.0);
}

#[test]
fn quotient() {
    // d/dx (1 / x) at x = 4
    let grad = reverse_grad(|x| Reverse::constant(1.0) / x, 4.0);
    assert_relative_eq!(grad, -1.0 / 16.0, max_relative = 1e-12);
}

#[test]
fn constants_stay_off_the_tape() {
    let tape = Tape::<f64>::new();
    let a = Reverse::constant(2.0);
    let b = Reverse::constant(3.0);
    let c = a * b + Reverse::from_f64(1.0);
    assert_eq!(c.primal(), 7.0);
    assert_eq!(c.index(), adops::tape::CONSTANT);
    assert!(tape.is_empty());
}

#[test]
fn mixed_constant_and_variable() {
    let grad = reverse_grad(|x| Reverse::from_f64(5.0) - x * Reverse::from_f64(2.0), 1.0);
    assert_eq!(grad, -2.0);
}

// ── Elementals ──

#[test]
fn sin() {
    check_reverse_elemental(|x| x.sin(), f64::sin, 0.7, 1e-6);
}

#[test]
fn cos() {
    check_reverse_elemental(|x| x.cos(), f64::cos, 0.7, 1e-6);
}

#[test]
fn tan() {
    check_reverse_elemental(|x| x.tan(), f64::tan, 0.4, 1e-6);
}

#[test]
fn exp_and_ln() {
    check_reverse_elemental(|x| x.exp(), f64::exp, 1.3, 1e-6);
    check_reverse_elemental(|x| x.ln(), f64::ln, 2.5, 1e-6);
}

#[test]
fn sqrt_and_tanh() {
    check_reverse_elemental(|x| x.sqrt(), f64::sqrt, 3.0, 1e-6);
    check_reverse_elemental(|x| x.tanh(), f64::tanh, 0.3, 1e-6);
}

#[test]
fn powi() {
    check_reverse_elemental(|x| x.powi(5), |x| x.powi(5), 1.2, 1e-6);
}

#[test]
fn fan_out() {
    // y = sin(x)·x + x: x feeds three statements.
    check_reverse_elemental(|x| x.sin() * x + x, |x| x.sin() * x + x, 0.8, 1e-6);
}

// ── Nesting ──

#[test]
fn reverse_over_dual_carries_tangents() {
    use adops::Dual;
    // Adjoint of x³ in the dual direction: d/dx 3x² = 6x.
    let tape = Tape::<Dual<f64>>::new();
    let x = Reverse::variable(&tape, Dual::variable(2.0));
    let y = x.powi(3);
    let adjoint = tape.reverse(y.index())[x.index() as usize];
    assert_eq!(adjoint.re, 12.0);
    assert_eq!(adjoint.eps, 12.0);
}

#[test]
fn powi_zero_is_constant_at_the_origin() {
    assert_eq!(reverse_grad(|x| x.powi(0), 0.0), 0.0);
    assert_eq!(reverse_grad(|x| x.powi(1), 0.0), 1.0);
}
