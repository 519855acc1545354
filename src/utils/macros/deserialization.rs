//! Case-insensitive deserialization for `{"type": ..., "value": ...}` tagged enums.

/// Implements `Deserialize` for an enum whose variants each wrap a string-like value and are
/// written as `{"type": "<variant>", "value": "<string>"}`. The `type` tag is matched
/// case-insensitively against the lowercase names given to the macro.
#[macro_export]
macro_rules! impl_case_insensitive_enum {
	($enum_name:ident, { $($variant_str:expr => $variant:ident),* $(,)? }) => {
		impl<'de> ::serde::Deserialize<'de> for $enum_name {
			fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
			where
				D: ::serde::Deserializer<'de>,
			{
				#[derive(::serde::Deserialize)]
				#[serde(deny_unknown_fields)]
				struct Tagged {
					#[serde(rename = "type")]
					kind: String,
					value: String,
				}

				let tagged = Tagged::deserialize(deserializer)?;
				match tagged.kind.to_lowercase().as_str() {
					$(
						$variant_str => Ok($enum_name::$variant(tagged.value.into())),
					)*
					_ => Err(<D::Error as ::serde::de::Error>::unknown_variant(
						&tagged.kind,
						&[$($variant_str),*],
					)),
				}
			}
		}
	};
}
