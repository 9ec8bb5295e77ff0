use super::{inputs, outputs};
use crate::{ExecutionResult, PrimitiveContext};

macro_rules! shuffle {
    (
        $(
            $(#[$doc:meta])* $name:ident : $($in:ident)* -- $($out:ident)*
        );* $(;)?
    ) => {
        $(
            $(#[$doc])*
            pub fn $name(ctx: &mut PrimitiveContext) -> ExecutionResult {
                #[allow(unused)]
                let [$($in),*] = inputs(ctx)?;
                outputs(ctx, [$($out.clone()),*])
            }
        )*
    };
}

shuffle! {
    dup: x -- x x ;

    drop: x -- ;

    swap: x y -- y x ;

    over: x y -- x y x ;

    /// rotates top three elements backwards
    rot: x y z -- y z x ;
}
