//! Characteristic polynomial and exact rational eigenvalues
//!
//! The characteristic polynomial is built with the Faddeev–LeVerrier
//! recurrence, which only needs matrix products, traces and division by
//! small integers, so it stays exact over the rationals. Eigenvalues are
//! the rational roots of its square-free part, isolated by Sturm bisection,
//! with multiplicities recovered by synthetic division.
//! A polynomial that does not split into linear factors over ℚ is
//! rejected rather than approximated.

use std::collections::BTreeMap;
use dashu_int::IBig;
use weyr_plugin::prelude::*;
use crate::types::Matrix;
use crate::helpers::*;

/// Polynomial with rational coefficients, lowest degree first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polynomial {
    coeffs: Vec<Rational>,
}

/// A distinct eigenvalue with its algebraic multiplicity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eigenvalue {
    pub value: Rational,
    pub multiplicity: usize,
}

impl Polynomial {
    /// Build from ascending coefficients, dropping leading zeros
    pub fn new(mut coeffs: Vec<Rational>) -> Self {
        while coeffs.len() > 1 && coeffs.last().map_or(false, Rational::is_zero) {
            coeffs.pop();
        }
        if coeffs.is_empty() {
            coeffs.push(Rational::zero());
        }
        Polynomial { coeffs }
    }

    pub fn coeffs(&self) -> &[Rational] {
        &self.coeffs
    }

    pub fn degree(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.iter().all(Rational::is_zero)
    }

    fn leading(&self) -> &Rational {
        &self.coeffs[self.coeffs.len() - 1]
    }

    /// Horner evaluation
    pub fn eval(&self, x: &Rational) -> Rational {
        self.coeffs.iter().rev()
            .fold(Rational::zero(), |acc, c| acc.mul(x).add(c))
    }

    fn neg(&self) -> Polynomial {
        Polynomial::new(self.coeffs.iter().map(Rational::neg).collect())
    }

    pub fn derivative(&self) -> Polynomial {
        let coeffs = self.coeffs.iter()
            .enumerate()
            .skip(1)
            .map(|(i, c)| c.mul(&Rational::from_i64(i as i64)))
            .collect();
        Polynomial::new(coeffs)
    }

    /// Scale so the leading coefficient is one
    fn monic(&self) -> Polynomial {
        match self.leading().recip() {
            Some(inv) => Polynomial::new(self.coeffs.iter().map(|c| c.mul(&inv)).collect()),
            None => self.clone(),
        }
    }

    /// Polynomial long division: (quotient, remainder)
    pub fn div_rem(&self, divisor: &Polynomial) -> Result<(Polynomial, Polynomial), WeyrError> {
        if divisor.is_zero() {
            return Err(WeyrError::div_zero());
        }
        let d = divisor.degree();
        if self.degree() < d || self.is_zero() {
            return Ok((Polynomial::new(vec![Rational::zero()]), self.clone()));
        }

        let lead = divisor.leading();
        let mut rem = self.coeffs.clone();
        let mut quot = vec![Rational::zero(); self.degree() - d + 1];
        for k in (0..quot.len()).rev() {
            let c = rem[k + d].checked_div(lead)?;
            for (j, dc) in divisor.coeffs.iter().enumerate() {
                rem[k + j] = rem[k + j].sub(&c.mul(dc));
            }
            quot[k] = c;
        }
        rem.truncate(d.max(1));
        Ok((Polynomial::new(quot), Polynomial::new(rem)))
    }

    /// Monic greatest common divisor
    pub fn gcd(&self, other: &Polynomial) -> Result<Polynomial, WeyrError> {
        let (mut a, mut b) = (self.clone(), other.clone());
        while !b.is_zero() {
            let (_, r) = a.div_rem(&b)?;
            a = b;
            b = r;
        }
        Ok(a.monic())
    }

    /// p / gcd(p, p'): same roots, each with multiplicity one
    pub fn square_free(&self) -> Result<Polynomial, WeyrError> {
        if self.degree() == 0 {
            return Ok(self.clone());
        }
        let g = self.gcd(&self.derivative())?;
        let (q, _) = self.div_rem(&g)?;
        Ok(q.monic())
    }

    /// Divide by (x - root), returning the quotient and the remainder
    pub fn deflate(&self, root: &Rational) -> (Polynomial, Rational) {
        let n = self.degree();
        if n == 0 {
            return (Polynomial::new(vec![Rational::zero()]), self.coeffs[0].clone());
        }

        let mut quotient = vec![Rational::zero(); n];
        let mut carry = self.coeffs[n].clone();
        for i in (0..n).rev() {
            quotient[i] = carry.clone();
            carry = self.coeffs[i].add(&carry.mul(root));
        }
        (Polynomial::new(quotient), carry)
    }

    /// Scale to a primitive integer polynomial with the same roots
    fn to_primitive_integers(&self) -> Vec<IBig> {
        let denominators_lcm = self.coeffs.iter()
            .fold(IBig::ONE, |acc, c| lcm(&acc, &IBig::from(c.denominator().clone())));

        let scaled: Vec<IBig> = self.coeffs.iter()
            .map(|c| {
                let factor = denominators_lcm.clone() / IBig::from(c.denominator().clone());
                c.numerator().clone() * factor
            })
            .collect();

        let content = scaled.iter().fold(IBig::ZERO, |acc, c| gcd(&acc, c));
        if content == IBig::ZERO || content == IBig::ONE {
            return scaled;
        }
        scaled.into_iter().map(|c| c / content.clone()).collect()
    }

    /// Rational roots of a square-free polynomial, ascending.
    ///
    /// With a_n x^n + … + a_0 primitive, y = a_n x turns it into a monic
    /// integer polynomial whose rational roots are integers. Those are
    /// isolated by Sturm bisection over integer intervals inside the
    /// Cauchy bound.
    fn rational_roots(&self) -> Result<Vec<Rational>, WeyrError> {
        let mut ints = self.to_primitive_integers();
        let n = ints.len() - 1;
        if n == 0 {
            return Ok(Vec::new());
        }
        if ints[n] < IBig::ZERO {
            ints = ints.into_iter().map(|c| -c).collect();
        }
        let an = ints[n].clone();

        // c_i = a_i a_n^(n-1-i), c_n = 1
        let mut monic = vec![IBig::ONE; n + 1];
        let mut factor = IBig::ONE;
        for i in (0..n).rev() {
            monic[i] = ints[i].clone() * factor.clone();
            factor = factor * an.clone();
        }

        let bound = monic[..n].iter().map(abs).max().unwrap_or(IBig::ZERO) + IBig::ONE;
        let q = Polynomial::new(monic.into_iter().map(Rational::from_ibig).collect());
        let sturm = SturmSequence::new(&q)?;

        let two = IBig::from(2);
        let mut roots = Vec::new();
        let mut pending = vec![(-bound.clone() - IBig::ONE, bound)];
        while let Some((lo, hi)) = pending.pop() {
            if sturm.count(&lo, &hi) == 0 {
                continue;
            }
            if hi.clone() - lo.clone() == IBig::ONE {
                if q.eval(&Rational::from_ibig(hi.clone())).is_zero() {
                    roots.push(Rational::from_ibig(hi).checked_div(&Rational::from_ibig(an.clone()))?);
                }
                continue;
            }
            let mid = (lo.clone() + hi.clone()) / two.clone();
            pending.push((lo, mid.clone()));
            pending.push((mid, hi));
        }

        roots.sort();
        Ok(roots)
    }
}

/// Sturm chain p, p', -rem(p, p'), … of a square-free polynomial
struct SturmSequence {
    chain: Vec<Polynomial>,
}

impl SturmSequence {
    fn new(p: &Polynomial) -> Result<Self, WeyrError> {
        let mut chain = vec![p.clone(), p.derivative()];
        loop {
            let k = chain.len();
            if chain[k - 1].is_zero() {
                chain.pop();
                break;
            }
            let (_, r) = chain[k - 2].div_rem(&chain[k - 1])?;
            if r.is_zero() {
                break;
            }
            chain.push(r.neg());
        }
        Ok(SturmSequence { chain })
    }

    fn sign_changes(&self, at: &IBig) -> usize {
        let x = Rational::from_ibig(at.clone());
        let mut changes = 0;
        let mut last: Option<bool> = None;
        for p in &self.chain {
            let v = p.eval(&x);
            if v.is_zero() {
                continue;
            }
            let negative = v.is_negative();
            if last.is_some_and(|l| l != negative) {
                changes += 1;
            }
            last = Some(negative);
        }
        changes
    }

    /// Distinct real roots in (lo, hi]
    fn count(&self, lo: &IBig, hi: &IBig) -> usize {
        self.sign_changes(lo).saturating_sub(self.sign_changes(hi))
    }
}

fn abs(n: &IBig) -> IBig {
    if *n < IBig::ZERO { -n.clone() } else { n.clone() }
}

fn gcd(a: &IBig, b: &IBig) -> IBig {
    let (mut a, mut b) = (abs(a), abs(b));
    while b != IBig::ZERO {
        let r = &a % &b;
        a = b;
        b = r;
    }
    a
}

fn lcm(a: &IBig, b: &IBig) -> IBig {
    let g = gcd(a, b);
    if g == IBig::ZERO {
        return IBig::ZERO;
    }
    abs(&(a.clone() / g * b.clone()))
}

impl Matrix {
    /// det(xI - A) via Faddeev–LeVerrier, monic, lowest degree first
    pub fn characteristic_polynomial(&self) -> Result<Polynomial, WeyrError> {
        check_square(self, "charpoly")?;
        let n = self.rows;

        let mut coeffs = vec![Rational::zero(); n + 1];
        coeffs[n] = Rational::one();

        // M_1 = A, c_{n-k} = -tr(M_k)/k, M_{k+1} = A (M_k + c_{n-k} I)
        let mut m = self.clone();
        for k in 1..=n {
            let trace = m.trace()?;
            let c = trace.neg().checked_div(&Rational::from_i64(k as i64))?;
            coeffs[n - k] = c.clone();

            if k < n {
                let shifted = m.add(&Matrix::identity(n).scale(&c))?;
                m = self.matmul(&shifted)?;
            }
        }

        Ok(Polynomial::new(coeffs))
    }

    /// Distinct eigenvalues in ascending order with algebraic multiplicities
    pub fn eigenvalues(&self) -> Result<Vec<Eigenvalue>, WeyrError> {
        let mut poly = self.characteristic_polynomial()?;
        let mut found: BTreeMap<Rational, usize> = BTreeMap::new();

        while poly.degree() > 0 && poly.coeffs[0].is_zero() {
            *found.entry(Rational::zero()).or_default() += 1;
            poly = Polynomial::new(poly.coeffs[1..].to_vec());
        }

        if poly.degree() > 0 {
            for root in poly.square_free()?.rational_roots()? {
                let mut multiplicity = 0;
                loop {
                    let (quotient, remainder) = poly.deflate(&root);
                    if !remainder.is_zero() {
                        break;
                    }
                    multiplicity += 1;
                    poly = quotient;
                }
                if multiplicity == 0 {
                    return Err(WeyrError::invariant(format!(
                        "isolated root {} does not divide the characteristic polynomial", root
                    )));
                }
                found.insert(root, multiplicity);
            }
        }

        if poly.degree() > 0 {
            tracing::debug!(degree = poly.degree(), "no rational root for residual factor");
            return Err(WeyrError::irrational_spectrum(poly.degree()));
        }

        let eigenvalues: Vec<Eigenvalue> = found.into_iter()
            .map(|(value, multiplicity)| Eigenvalue { value, multiplicity })
            .collect();
        tracing::trace!(count = eigenvalues.len(), "eigenvalues extracted");
        Ok(eigenvalues)
    }
}

impl From<Eigenvalue> for Value {
    fn from(e: Eigenvalue) -> Value {
        let mut obj = BTreeMap::new();
        obj.insert("value".to_string(), Value::Number(e.value));
        obj.insert("multiplicity".to_string(), Value::from(e.multiplicity));
        Value::Object(obj)
    }
}

// ============================================================================
// CHARPOLY - Characteristic polynomial coefficients
// ============================================================================

pub struct CharPolyFn;

static CHARPOLY_ARGS: [ArgMeta; 1] = [ArgMeta::required("matrix", "Matrix", "Square matrix")];
static CHARPOLY_EXAMPLES: [&str; 1] = ["charpoly([[2, 1], [0, 2]]) → [4, -4, 1]"];
static CHARPOLY_RELATED: [&str; 2] = ["eigenvalues", "trace"];

impl FunctionPlugin for CharPolyFn {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "charpoly",
            description: "Coefficients of det(xI - A), constant term first",
            usage: "charpoly(matrix)",
            args: &CHARPOLY_ARGS,
            returns: "List",
            examples: &CHARPOLY_EXAMPLES,
            category: "matrix/spectrum",
            related: &CHARPOLY_RELATED,
        }
    }

    fn call(&self, args: &[Value], ctx: &EvalContext) -> Value {
        if args.len() != 1 {
            return Value::Error(WeyrError::arg_count("charpoly", 1, args.len()));
        }

        let matrix = match extract_matrix(&args[0], "charpoly", "matrix") {
            Ok(m) => m,
            Err(e) => return Value::Error(e),
        };
        if let Err(e) = check_limit(&matrix, ctx) {
            return Value::Error(e);
        }

        match matrix.characteristic_polynomial() {
            Ok(p) => Value::from(p.coeffs.clone()),
            Err(e) => Value::Error(e),
        }
    }
}

// ============================================================================
// EIGENVALUES - Exact rational spectrum
// ============================================================================

pub struct EigenvaluesFn;

static EIGENVALUES_ARGS: [ArgMeta; 1] = [ArgMeta::required("matrix", "Matrix", "Square matrix with rational eigenvalues")];
static EIGENVALUES_EXAMPLES: [&str; 1] = [
    "eigenvalues([[2, 1], [0, 2]]) → [{value: 2, multiplicity: 2}]",
];
static EIGENVALUES_RELATED: [&str; 2] = ["charpoly", "jordan_form"];

impl FunctionPlugin for EigenvaluesFn {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "eigenvalues",
            description: "Distinct rational eigenvalues (ascending) with algebraic multiplicity",
            usage: "eigenvalues(matrix)",
            args: &EIGENVALUES_ARGS,
            returns: "List",
            examples: &EIGENVALUES_EXAMPLES,
            category: "matrix/spectrum",
            related: &EIGENVALUES_RELATED,
        }
    }

    fn call(&self, args: &[Value], ctx: &EvalContext) -> Value {
        if args.len() != 1 {
            return Value::Error(WeyrError::arg_count("eigenvalues", 1, args.len()));
        }

        let matrix = match extract_matrix(&args[0], "eigenvalues", "matrix") {
            Ok(m) => m,
            Err(e) => return Value::Error(e),
        };
        if let Err(e) = check_limit(&matrix, ctx) {
            return Value::Error(e);
        }

        match matrix.eigenvalues() {
            Ok(values) => Value::from(values),
            Err(e) => Value::Error(e),
        }
    }
}
