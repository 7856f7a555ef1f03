//! `define_port_error!`: adapter error enums for driven ports.
//!
//! Each variant carries a display message and, optionally, the domain
//! [`Error`](crate::domain::Error) constructor it maps to. When every variant
//! names one (`=> "..." as service_unavailable("store unavailable")`), the
//! macro also emits `From<PortError> for Error`. A quoted public message
//! replaces the adapter detail in the client-facing error; without one the
//! display message is used.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )?
                    => $message:literal as $code:ident $( ($public:literal) )?
            ),* $(,)?
        }
    ) => {
        define_port_error!(@enum
            $(#[$outer])*
            $name { $( $(#[$variant_meta])* $variant $( { $($field : $ty),* } )? => $message, )* }
        );

        impl From<$name> for $crate::domain::Error {
            fn from(err: $name) -> Self {
                match &err {
                    $(
                        $name::$variant { .. } => {
                            define_port_error!(@domain err, $code $(, $public)?)
                        }
                    )*
                }
            }
        }
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:literal
            ),* $(,)?
        }
    ) => {
        define_port_error!(@enum
            $(#[$outer])*
            $name { $( $(#[$variant_meta])* $variant $( { $($field : $ty),* } )? => $message, )* }
        );
    };

    (@enum
        $(#[$outer:meta])*
        $name:ident {
            $( $(#[$variant_meta:meta])* $variant:ident $( { $($field:ident : $ty:ty),* } )? => $message:literal, )*
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                ::paste::paste! {
                    #[doc = concat!("Build [`", stringify!($name), "::", stringify!($variant), "`].")]
                    pub fn [<$variant:snake>]($( $($field: impl Into<$ty>),* )?) -> Self {
                        Self::$variant $( { $($field: $field.into()),* } )?
                    }
                }
            )*
        }
    };

    (@domain $err:ident, $code:ident) => {
        $crate::domain::Error::$code($err.to_string())
    };

    (@domain $err:ident, $code:ident, $public:literal) => {
        $crate::domain::Error::$code($public)
    };
}

pub(crate) use define_port_error;
