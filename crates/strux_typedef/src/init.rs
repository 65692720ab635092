//! Initializer synthesis for records and objects

use strux_ast::{FunctionNode, Ident, StructureTypeNode, VariableNode};
use strux_symbols::{
    attached_func_symbol_name, AttachedFunction, Flags, InvokableInfo, Origin, Span, SymbolDecl, SymbolId,
    TypeId,
};
use strux_types::{InvokableType, Type};
use tracing::{debug, instrument};

use crate::env::SymbolEnv;
use crate::error::SynthesisError;
use crate::synth::Synthesizer;

impl Synthesizer<'_> {
    /// Build the attached function `<Type>.<suffix>` with a receiver of type
    /// `ty`, no parameters and the given return type
    #[instrument(skip(self, env))]
    pub fn create_init_function(
        &mut self,
        span: Span,
        owner: SymbolId,
        env: &SymbolEnv<'_>,
        suffix: &str,
        ty: TypeId,
        return_type: TypeId,
    ) -> Result<FunctionNode, SynthesisError> {
        let package = env.package_id();
        let struct_name = self.type_name(ty)?;
        let func_name = attached_func_symbol_name(&struct_name, suffix);

        let receiver_decl = SymbolDecl::new(self.config.receiver_name.clone(), package, span)
            .origin(Origin::Virtual)
            .ty(ty);
        let receiver = self.symbols.create_variable_symbol(receiver_decl);

        let func_ty = self.types.alloc(Type::Invokable(InvokableType {
            params: Vec::new(),
            rest: None,
            ret: return_type,
        }));

        let func_decl = SymbolDecl::new(func_name.clone(), package, span)
            .flags(Flags::ATTACHED)
            .origin(Origin::Virtual)
            .ty(func_ty)
            .owner(owner);
        let func = self.symbols.create_function_symbol(func_decl, true);
        self.symbols.new_scope(func);
        self.symbols.define_in(func, self.config.receiver_name.clone(), receiver)?;
        if let Some(info) = self.symbols.get_mut(func).function_mut() {
            info.receiver = Some(receiver);
            info.return_type = Some(return_type);
        }
        self.symbols.get_mut(receiver).owner = Some(func);

        // The invokable type gets its own symbol mirroring the signature
        let type_decl = SymbolDecl::new(func_name.clone(), package, span)
            .flags(Flags::ATTACHED)
            .origin(Origin::Virtual)
            .ty(func_ty)
            .owner(func);
        let info = InvokableInfo {
            params: Vec::new(),
            rest_param: None,
            return_type: Some(return_type),
        };
        let func_tsym = self.symbols.create_invokable_type_symbol(type_decl, info);
        self.types.set_tsymbol(func_ty, func_tsym);

        debug!(name = %func_name, %func, "created initializer");

        Ok(FunctionNode {
            name: Ident::new(func_name, span),
            symbol: func,
            ty: func_ty,
            receiver: Some(VariableNode {
                name: Ident::new(self.config.receiver_name.clone(), span),
                ty,
                symbol: receiver,
                span,
            }),
            return_type,
            flags: Flags::ATTACHED,
            attached: true,
            span,
        })
    }

    /// Give a record or object node its initializer. The function is bound in
    /// the structure's scope and recorded on the structure's type symbol.
    pub fn create_structure_init_function(
        &mut self,
        node: &mut StructureTypeNode,
        env: &SymbolEnv<'_>,
    ) -> Result<SymbolId, SynthesisError> {
        let ty = node.ty.ok_or(SynthesisError::IncompleteNode { what: "structure node without a type" })?;
        let structure = match node.symbol {
            Some(symbol) => symbol,
            None => self.type_symbol(ty)?,
        };
        let return_type = self.config.init_returns.unwrap_or(self.types.builtins.nil);
        let suffix = self.config.init_suffix.clone();

        let init = self.create_init_function(node.span, structure, env, &suffix, ty, return_type)?;
        self.symbols.define_in(structure, init.name.name.clone(), init.symbol)?;

        let attached = AttachedFunction {
            name: init.name.name.clone(),
            symbol: init.symbol,
            ty: init.ty,
            span: init.span,
        };
        let info = self
            .symbols
            .get_mut(structure)
            .type_info_mut()
            .ok_or(SynthesisError::UnexpectedSymbol { symbol: structure, expected: "a type symbol" })?;
        info.initializer = Some(attached);

        let symbol = init.symbol;
        node.init_function = Some(Box::new(init));
        Ok(symbol)
    }
}
