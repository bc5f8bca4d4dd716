//! `Transform` foreign class
//!
//! A 2D affine transform stored as `[a, b, c, d, tx, ty]`, mapping
//! `(x, y)` to `(a*x + c*y + tx, b*x + d*y + ty)`. Instances start as the
//! identity; the `set*` operations replace the whole transform and
//! `concat(_)` appends another transform after this one. The class has no
//! finalizer: the storage holds no native resources.

use finch_sdk::{
    AbiResult, CallFrame, DispatchKey, ForeignClassMethods, ForeignClassRegistry, ForeignData,
    ForeignMethodRegistry, HostValue, RegistryError,
};

use crate::GUI_MODULE;

const CLASS: &str = "Transform";

/// Affine transform storage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    /// x scale / rotation
    pub a: f64,
    /// y shear / rotation
    pub b: f64,
    /// x shear / rotation
    pub c: f64,
    /// y scale / rotation
    pub d: f64,
    /// x translation
    pub tx: f64,
    /// y translation
    pub ty: f64,
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine {
    /// The identity transform.
    pub const IDENTITY: Affine = Affine {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    /// Counter-clockwise rotation by `degrees`.
    pub fn rotation(degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            ..Self::IDENTITY
        }
    }

    /// Translation by `(x, y)`.
    pub fn translation(x: f64, y: f64) -> Self {
        Self {
            tx: x,
            ty: y,
            ..Self::IDENTITY
        }
    }

    /// Scale by `(x, y)`.
    pub fn scale(x: f64, y: f64) -> Self {
        Self {
            a: x,
            d: y,
            ..Self::IDENTITY
        }
    }

    /// `self` followed by `then`.
    pub fn concat(&self, then: &Affine) -> Self {
        Self {
            a: self.a * then.a + self.b * then.c,
            b: self.a * then.b + self.b * then.d,
            c: self.c * then.a + self.d * then.c,
            d: self.c * then.b + self.d * then.d,
            tx: self.tx * then.a + self.ty * then.c + then.tx,
            ty: self.tx * then.b + self.ty * then.d + then.ty,
        }
    }

    /// Map a point.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (self.a * x + self.c * y + self.tx, self.b * x + self.d * y + self.ty)
    }

    /// The six components in storage order.
    pub fn to_array(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.d, self.tx, self.ty]
    }

    /// The six components as a script list.
    pub fn to_value(&self) -> HostValue {
        HostValue::nums(&self.to_array())
    }
}

/// Copy the transform stored in the foreign object at `slot`.
pub fn read_transform(frame: &dyn CallFrame, slot: usize) -> AbiResult<Affine> {
    let object = frame.get_foreign(slot)?;
    let transform = *object.borrow::<Affine>()?;
    Ok(transform)
}

fn replace(frame: &mut dyn CallFrame, transform: Affine) -> AbiResult<()> {
    let object = frame.get_foreign(0)?;
    *object.borrow_mut::<Affine>()? = transform;
    Ok(())
}

/// Register the `Transform` class lifecycle and its methods.
pub fn register(methods: &mut ForeignMethodRegistry, classes: &mut ForeignClassRegistry) -> Result<(), RegistryError> {
    classes.register(
        GUI_MODULE,
        CLASS,
        ForeignClassMethods::new(|_: &mut dyn CallFrame| Ok(Box::new(Affine::IDENTITY) as ForeignData)),
    )?;

    methods.register_fn(transform_key("setRotation(_)"), |frame: &mut dyn CallFrame| {
        let degrees = frame.get_num(1)?;
        replace(frame, Affine::rotation(degrees))
    })?;
    methods.register_fn(transform_key("setTranslation(_,_)"), |frame: &mut dyn CallFrame| {
        let (x, y) = (frame.get_num(1)?, frame.get_num(2)?);
        replace(frame, Affine::translation(x, y))
    })?;
    methods.register_fn(transform_key("setScale(_,_)"), |frame: &mut dyn CallFrame| {
        let (x, y) = (frame.get_num(1)?, frame.get_num(2)?);
        replace(frame, Affine::scale(x, y))
    })?;
    methods.register_fn(transform_key("concat(_)"), |frame: &mut dyn CallFrame| {
        // Copied out first so `t.concat(t)` does not hold two borrows
        let then = read_transform(frame, 1)?;
        let current = read_transform(frame, 0)?;
        replace(frame, current.concat(&then))
    })?;
    methods.register_fn(transform_key("matrix"), |frame: &mut dyn CallFrame| {
        let transform = read_transform(frame, 0)?;
        frame.ret(transform.to_value())
    })?;
    Ok(())
}

fn transform_key(signature: &str) -> DispatchKey {
    DispatchKey::instance(GUI_MODULE, CLASS, signature)
}
